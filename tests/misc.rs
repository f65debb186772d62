#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    tests! {
        empty_file in misc is OK
    }

    tests! {
        precedence in misc is OK
        "7"
        "9"
        "7"
        "1"
        "true"
        "true"
    }

    tests! {
        unexpected_character in misc is ERR
        "[line 1:11] Error: Unexpected character '|'"
    }
}
