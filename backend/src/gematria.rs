//! Hebrew numeral (gematria) and folio (daf) citation formatting.
//!
//! Talmudic folios are two-sided: amud a is cited with a trailing `.` and
//! amud b with a trailing `:` in Hebrew, or with `a`/`b` suffixes in Latin
//! transliteration.

const ONES: [&str; 10] = ["", "א", "ב", "ג", "ד", "ה", "ו", "ז", "ח", "ט"];
const TENS: [&str; 10] = ["", "י", "כ", "ל", "מ", "נ", "ס", "ע", "פ", "צ"];
const HUNDREDS: [&str; 4] = ["", "ק", "ר", "ש"];

/// Render a positive integer as a Hebrew ordinal numeral, without
/// gershayim or geresh marks.
///
/// Values are truncated mod 1000 first; 0 renders as the empty string.
/// 15 and 16 use the customary טו and טז forms (avoiding letter pairs
/// that spell the divine name).
pub fn to_gematria(i: usize) -> String {
    let n = i % 1000;
    let mut s = String::new();

    // 400 is the highest single letter; larger hundreds stack ת.
    let hundreds = n / 100;
    for _ in 0..(hundreds / 4) {
        s.push('ת');
    }
    s.push_str(HUNDREDS[hundreds % 4]);

    let rem = n % 100;
    if rem == 15 {
        s.push_str("טו");
    } else if rem == 16 {
        s.push_str("טז");
    } else {
        s.push_str(TENS[rem / 10]);
        s.push_str(ONES[rem % 10]);
    }

    s
}

/// Hebrew folio citation for the amud at 1-based position `pos`.
///
/// Positions 1, 2, 3, 4, ... map to דף א. , א: , ב. , ב: , ...
pub fn to_daf(pos: usize) -> String {
    let n = pos + 1;
    if n % 2 == 0 {
        format!("{}.", to_gematria(n / 2))
    } else {
        format!("{}:", to_gematria(n / 2))
    }
}

/// Latin folio citation for the amud at 1-based position `pos`.
///
/// Positions 1, 2, 3, 4, ... map to 1a, 1b, 2a, 2b, ...
pub fn to_daf_latin(pos: usize) -> String {
    let n = pos + 1;
    if n % 2 == 0 {
        format!("{}a", n / 2)
    } else {
        format!("{}b", n / 2)
    }
}
