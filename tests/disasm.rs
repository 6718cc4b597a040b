use chip8_rs::decoder::decode;
use chip8_rs::disasm::{fmt_decoded, fmt_word, tokenize_window, render};
use pretty_assertions::assert_eq;

fn text(w: u16) -> String {
    fmt_decoded(&decode(w).unwrap())
}

#[test]
fn listing_text_for_every_form() {
    let cases = [
        (0x00E0, "CLS"),
        (0x00EE, "RET"),
        (0x0123, "SYS 0x123"),
        (0x1234, "JP 0x234"),
        (0x2ABC, "CALL 0xabc"),
        (0x3A12, "SE Va, 0x12"),
        (0x4B00, "SNE Vb, 0x0"),
        (0x5120, "SE V1, V2"),
        (0x6CFF, "LD Vc, 0xff"),
        (0x7D01, "ADD Vd, 0x1"),
        (0x8120, "LD V1, V2"),
        (0x8121, "OR V1, V2"),
        (0x8122, "AND V1, V2"),
        (0x8123, "XOR V1, V2"),
        (0x8124, "ADD V1, V2"),
        (0x8125, "SUB V1, V2"),
        (0x8126, "SHR V1, 0x1"),
        (0x8127, "SUBN V1, V2"),
        (0x812E, "SHL V1, 0x1"),
        (0x9EF0, "SNE Ve, Vf"),
        (0xA3F0, "LD I, 0x3f0"),
        (0xB208, "JP V0, 0x208"),
        (0xC70F, "RND V7, 0xf"),
        (0xD12F, "DRW V1, V2, 0xf"),
        (0xE59E, "SKP V5"),
        (0xE5A1, "SKNP V5"),
        (0xF207, "LD V2, DT"),
        (0xF20A, "LD V2, K"),
        (0xF215, "LD DT, V2"),
        (0xF218, "LD ST, V2"),
        (0xF21E, "ADD I, V2"),
        (0xF229, "LD F, V2"),
        (0xF233, "LD B, V2"),
        (0xF255, "LD [I], V2"),
        (0xF265, "LD V2, [I]"),
    ];
    for (w, want) in cases {
        assert_eq!(text(w), want, "word {w:#06x}");
    }
}

#[test]
fn data_words_render_as_emit() {
    assert_eq!(fmt_word(0x8FFF), "_emit 0x8f 0xff");
    assert_eq!(fmt_word(0xE000), "_emit 0xe0 0x0");
    assert_eq!(fmt_word(0x00E0), "CLS");
}

#[test]
fn window_tokens_render_like_words() {
    let bytes = [0xD1, 0x2F, 0xF1, 0x00];
    let (toks, len) = tokenize_window(&bytes[0..]).unwrap();
    assert_eq!(len, 2);
    assert_eq!(render(&toks), "DRW V1, V2, 0xf");
    let (toks, _) = tokenize_window(&bytes[2..]).unwrap();
    assert_eq!(render(&toks), "_emit 0xf1 0x0");
}
