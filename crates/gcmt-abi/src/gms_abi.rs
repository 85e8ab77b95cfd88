//! User-info decoders for data-exchange callers.

use std::ffi::c_int;

use gcmt_core::gms;

/// Equation type stored in an equation symbol's user info, or -1.
#[unsafe(no_mangle)]
pub extern "C" fn gmsFixEquType(user_info: c_int) -> c_int {
    gms::fix_equ_type(user_info)
}

/// Variable type stored in a variable symbol's user info, or -1.
#[unsafe(no_mangle)]
pub extern "C" fn gmsFixVarType(user_info: c_int) -> c_int {
    gms::fix_var_type(user_info)
}
