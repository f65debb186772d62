#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        define in variable is OK
        "1"
        "nil"
    }

    tests! {
        redeclare_global in variable is OK
        "2"
    }

    tests! {
        shadow in variable is OK
        "local"
        "global"
    }

    tests! {
        early_bound in variable is OK
        "global"
        "global"
    }

    tests! {
        undefined in variable is ERR
        "Undefined variable 'notDefined'"
        "[line 1]"
    }

    tests! {
        use_in_own_initializer in variable is ERR
        "[line 2:11] Error at 'a': Cannot read local variable in its own initializer"
    }

    tests! {
        redeclare_local in variable is ERR
        "[line 3:7] Error at 'a': A variable is already defined with name 'a' in this scope"
    }
}
