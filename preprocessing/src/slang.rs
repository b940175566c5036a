/// Informal surface forms and their canonical replacements.
///
/// Lookup is an exact match against already-lowercased tokens. No target is
/// itself a key, so a single replacement pass is stable.
pub const SLANG_DICTIONARY: &[(&str, &str)] = &[
    ("yg", "yang"),
    ("dgn", "dengan"),
    ("gak", "tidak"),
    ("ga", "tidak"),
    ("tp", "tapi"),
    ("bgt", "banget"),
    ("udah", "sudah"),
    ("aja", "saja"),
    ("jd", "jadi"),
    ("d", "di"),
    ("sprt", "seperti"),
    ("opr", "operasional"),
    ("sdh", "sudah"),
    ("tlg", "tolong"),
    ("krn", "karena"),
    ("jgn", "jangan"),
    ("tdk", "tidak"),
    ("kalo", "kalau"),
    ("klo", "kalau"),
    ("blm", "belum"),
    ("bkn", "bukan"),
    ("tak", "tidak"),
    ("tau", "tahu"),
    ("aq", "aku"),
    ("km", "kamu"),
    ("bs", "bisa"),
    ("dlm", "dalam"),
    ("utk", "untuk"),
];
