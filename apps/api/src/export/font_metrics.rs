//! Static Helvetica width table and WinAnsi encoding for the growth-plan PDF.
//!
//! Widths are the standard Type 1 Helvetica AFM values in 1/1000 em. Helvetica is
//! one of the 14 base PDF fonts, so no font program is embedded and Regular widths
//! match what viewers draw. Helvetica-Bold is approximated by scaling the Regular
//! table; it is only used to center the title, where a point or two of error is
//! invisible. Index = (char as usize) - 32 for ASCII 0x20..=0x7E.

use serde::{Deserialize, Serialize};

/// Font faces used by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    /// Body text — Helvetica.
    Regular,
    /// Title — Helvetica-Bold.
    Bold,
}

impl FontFace {
    /// Resource name inside the page's font dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
        }
    }

    /// Approximate Bold/Regular width ratio. Not exact per glyph.
    fn width_scale(&self) -> f32 {
        match self {
            FontFace::Regular => 1.0,
            FontFace::Bold => 1.08,
        }
    }
}

/// Width used for WinAnsi characters outside the ASCII table.
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0    1    2    3    4    5    6    7    8    9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // :    ;    <    =    >    ?    @
    278, 278, 584, 584, 584, 556, 1015,
    // A    B    C    D    E    F    G    H    I    J    K    L    M
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [    \    ]    ^    _    `
    278, 278, 278, 469, 556, 333,
    // a    b    c    d    e    f    g    h    i    j    k    l    m
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    // n    o    p    q    r    s    t    u    v    w    x    y    z
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // {    |    }    ~
    334, 260, 334, 584,
];

/// Maps a character to its single-byte WinAnsiEncoding code.
/// Characters the encoding cannot represent become `?`.
pub fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{20AC}' => 0x80,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
        _ => b'?',
    }
}

/// Encodes a string as WinAnsi bytes for a PDF string literal.
pub fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars().map(win_ansi_byte).collect()
}

fn byte_width(b: u8) -> u16 {
    match b {
        0x20..=0x7E => HELVETICA_WIDTHS[(b - 0x20) as usize],
        0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x95 => 350,
        0x85 | 0x97 => 1000,
        _ => FALLBACK_WIDTH,
    }
}

/// Measures the rendered width of a string in points at `size_pt`.
/// Measured after WinAnsi substitution, so replaced characters count as `?`.
pub fn measure_pt(s: &str, face: FontFace, size_pt: f32) -> f32 {
    let units: u32 = s
        .chars()
        .map(|c| byte_width(win_ansi_byte(c)) as u32)
        .sum();
    units as f32 / 1000.0 * size_pt * face.width_scale()
}

/// Greedy word-wrap of `text` into lines no wider than `max_width_pt`.
///
/// All whitespace (including newlines) collapses to single spaces, so the text
/// flows as one paragraph. A single word wider than the line is split by character.
pub fn wrap_text(text: &str, face: FontFace, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let space_w = measure_pt(" ", face, size_pt);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = measure_pt(word, face, size_pt);

        if word_w > max_width_pt {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            for piece in split_long_word(word, face, size_pt, max_width_pt) {
                lines.push(piece);
            }
            // Last piece stays open so following words can join it.
            if let Some(last) = lines.pop() {
                current_width = measure_pt(&last, face, size_pt);
                current = last;
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + space_w + word_w > max_width_pt {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += space_w + word_w;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_long_word(word: &str, face: FontFace, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;

    for c in word.chars() {
        let w = byte_width(win_ansi_byte(c)) as f32 / 1000.0 * size_pt * face.width_scale();
        if !piece.is_empty() && width + w > max_width_pt {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
