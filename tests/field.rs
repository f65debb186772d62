#[macro_use]
mod common;

#[cfg(test)]
mod field {
    tests! {
        get_set in field is OK
        "42"
        "43"
    }

    tests! {
        fields_shadow_methods in field is OK
        "method"
        "field"
    }

    tests! {
        undefined in field is ERR
        "Undefined property 'missing'"
        "[line 2]"
    }

    tests! {
        set_on_non_instance in field is ERR
        "Only instances have fields"
        "[line 1]"
    }

    tests! {
        get_on_non_instance in field is ERR
        "Only instances have properties"
        "[line 1]"
    }
}
