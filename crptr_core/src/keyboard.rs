//! Neighbouring keys on a QWERTY keyboard, split into keys on the same row
//! and keys in the same column. Only lower-case letters and digits have
//! neighbours.

/// Keys adjacent to `key` on the same keyboard row.
pub fn row_neighbours(key: char) -> Option<&'static str> {
    let neighbours = match key {
        'a' => "s",
        'b' => "vn",
        'c' => "xv",
        'd' => "sf",
        'e' => "wr",
        'f' => "dg",
        'g' => "fh",
        'h' => "gj",
        'i' => "uo",
        'j' => "hk",
        'k' => "jl",
        'l' => "k",
        'm' => "n",
        'n' => "bm",
        'o' => "ip",
        'p' => "o",
        'q' => "w",
        'r' => "et",
        's' => "ad",
        't' => "ry",
        'u' => "yi",
        'v' => "cb",
        'w' => "qe",
        'x' => "zc",
        'y' => "tu",
        'z' => "x",
        '1' => "2",
        '2' => "13",
        '3' => "24",
        '4' => "35",
        '5' => "46",
        '6' => "57",
        '7' => "68",
        '8' => "79",
        '9' => "80",
        '0' => "9",
        _ => return None,
    };
    Some(neighbours)
}

/// Keys above or below `key` in the same keyboard column.
pub fn column_neighbours(key: char) -> Option<&'static str> {
    let neighbours = match key {
        'a' => "qzw",
        'b' => "gh",
        'c' => "df",
        'd' => "erc",
        'e' => "ds34",
        'f' => "rvc",
        'g' => "tbv",
        'h' => "ybn",
        'i' => "k89",
        'j' => "umn",
        'k' => "im",
        'l' => "o",
        'm' => "jk",
        'n' => "hj",
        'o' => "l90",
        'p' => "0",
        'q' => "a12",
        'r' => "f45",
        's' => "wxz",
        't' => "g56",
        'u' => "j78",
        'v' => "fg",
        'w' => "s23",
        'x' => "sd",
        'y' => "h67",
        'z' => "as",
        '1' => "q",
        '2' => "qw",
        '3' => "we",
        '4' => "er",
        '5' => "rt",
        '6' => "ty",
        '7' => "yu",
        '8' => "ui",
        '9' => "io",
        '0' => "op",
        _ => return None,
    };
    Some(neighbours)
}
