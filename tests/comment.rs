#[macro_use]
mod common;

#[cfg(test)]
mod comment {
    tests! {
        line in comment is OK
        "ok"
    }

    tests! {
        only in comment is OK
    }
}
