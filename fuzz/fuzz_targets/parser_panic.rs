#![no_main]
use libfuzzer_sys::fuzz_target;
use texel_syntax::{lexer::tokenize, parse};

fuzz_target!(|data: &[u8]| {
    // Lossy conversion keeps inputs that are "almost" text in play.
    let s = String::from_utf8_lossy(data);

    let lexed: String = tokenize(&s).iter().map(|t| t.text).collect();
    assert_eq!(lexed, s);

    let result = parse(&s);
    assert_eq!(result.syntax().text().to_string(), s);
});
