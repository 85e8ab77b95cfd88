//! GAMS global constants.
//!
//! Text tables, special values and default records consumed by the
//! data-exchange layer. Pure data plus the two user-info decoders.

// ---------------------------------------------------------------------------
// Table sizes
// ---------------------------------------------------------------------------

pub const GMS_DT_MAX: usize = 5;
pub const GMS_VARTYPE_MAX: usize = 10;
pub const GMS_EQUTYPE_MAX: usize = 7;
pub const GMS_VAL_MAX: usize = 5;
pub const GMS_SVIDX_MAX: usize = 7;
pub const STAT_MAX: usize = 9;
pub const SS_MAX: usize = 14;
pub const MS_MAX: usize = 20;

/// Offset added to an equation type when it is stored as symbol user info.
pub const GMS_EQU_USERINFO_BASE: i32 = 53;

/// Returned by the user-info decoders when no valid type is stored.
pub const GMS_TYPE_NOT_STORED: i32 = -1;

// ---------------------------------------------------------------------------
// Special values
// ---------------------------------------------------------------------------

pub const GMS_SV_UNDEF: f64 = 1.0e300;
pub const GMS_SV_NA: f64 = 2.0e300;
pub const GMS_SV_PINF: f64 = 3.0e300;
pub const GMS_SV_MINF: f64 = 4.0e300;
pub const GMS_SV_EPS: f64 = 5.0e300;
pub const GMS_SV_ACR: f64 = 10.0e300;

// ---------------------------------------------------------------------------
// Text tables
// ---------------------------------------------------------------------------

pub const GMS_GDX_TYPE_TEXT: [&str; GMS_DT_MAX] =
    ["Set", "Parameter", "Variable", "Equation", "Alias"];

pub const GMS_VAR_TYPE_TEXT: [&str; GMS_VARTYPE_MAX] = [
    "Unknown", "Binary", "Integer", "Positive", "Negative", "Free", "Sos1", "Sos2", "Semicont",
    "Semiint",
];

pub const GMS_VAL_TYPE_TEXT: [&str; GMS_VAL_MAX] = [".l", ".m", ".lo", ".up", ".scale"];

pub const GMS_SV_TEXT: [&str; GMS_SVIDX_MAX] = ["UNdef", "NA", "+Inf", "-Inf", "Eps", "0", "AcroN"];

pub const RC_STAT: [&str; STAT_MAX] = [
    "     ", " NOPT", "INFES", "UNBND", " ****", "UNKNW", "REDEF", "DEPND", "REDIR",
];

pub const SOLVE_STATUS_TXT: [&str; SS_MAX] = [
    "NA                      ",
    "Normal Completion       ",
    "Iteration Interrupt     ",
    "Resource Interrupt      ",
    "Terminated By Solver    ",
    "Evaluation Interrupt    ",
    "Capability Problems     ",
    "Licensing Problems      ",
    "User Interrupt          ",
    "Setup Failure           ",
    "Solver Failure          ",
    "Internal Solver Failure ",
    "Solve Processing Skipped",
    "System Failure          ",
];

pub const MODEL_STATUS_TXT: [&str; MS_MAX] = [
    "NA                      ",
    "Optimal                 ",
    "Locally Optimal         ",
    "Unbounded               ",
    "Infeasible              ",
    "Locally Infeasible      ",
    "Intermediate Infeasible ",
    "Feasible Solution       ",
    "Integer Solution        ",
    "Intermediate Non-Integer",
    "Integer Infeasible      ",
    "Licensing Problem       ",
    "Error Unknown           ",
    "Error No Solution       ",
    "No Solution Returned    ",
    "Solved Unique           ",
    "Solved                  ",
    "Solved Singular         ",
    "Unbounded - No Solution ",
    "Infeasible - No Solution",
];

// ---------------------------------------------------------------------------
// Default records
// ---------------------------------------------------------------------------

/// Default `.l .m .lo .up .scale` per variable type.
pub const GMS_DEF_REC_VAR: [[f64; GMS_VAL_MAX]; GMS_VARTYPE_MAX] = [
    [0.0, 0.0, 0.0, 0.0, 1.0],                 // unknown
    [0.0, 0.0, 0.0, 1.0, 1.0],                 // binary
    [0.0, 0.0, 0.0, 100.0, 1.0],               // integer
    [0.0, 0.0, 0.0, GMS_SV_PINF, 1.0],         // positive
    [0.0, 0.0, GMS_SV_MINF, 0.0, 1.0],         // negative
    [0.0, 0.0, GMS_SV_MINF, GMS_SV_PINF, 1.0], // free
    [0.0, 0.0, 0.0, GMS_SV_PINF, 1.0],         // sos1
    [0.0, 0.0, 0.0, GMS_SV_PINF, 1.0],         // sos2
    [0.0, 0.0, 1.0, GMS_SV_PINF, 1.0],         // semicont
    [0.0, 0.0, 1.0, 100.0, 1.0],               // semiint
];

/// Default `.l .m .lo .up .scale` per equation type.
pub const GMS_DEF_REC_EQU: [[f64; GMS_VAL_MAX]; GMS_EQUTYPE_MAX] = [
    [0.0, 0.0, 0.0, 0.0, 1.0],                 // =e=
    [0.0, 0.0, 0.0, GMS_SV_PINF, 1.0],         // =g=
    [0.0, 0.0, GMS_SV_MINF, 0.0, 1.0],         // =l=
    [0.0, 0.0, GMS_SV_MINF, GMS_SV_PINF, 1.0], // =n=
    [0.0, 0.0, 0.0, 0.0, 1.0],                 // =x=
    [0.0, 0.0, 0.0, GMS_SV_PINF, 1.0],         // =c=
    [0.0, 0.0, 0.0, 0.0, 1.0],                 // =b=
];

// ---------------------------------------------------------------------------
// Typed indices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VariableType {
    Unknown = 0,
    Binary,
    Integer,
    Positive,
    Negative,
    Free,
    Sos1,
    Sos2,
    Semicont,
    Semiint,
}

impl VariableType {
    pub const ALL: [Self; GMS_VARTYPE_MAX] = [
        Self::Unknown,
        Self::Binary,
        Self::Integer,
        Self::Positive,
        Self::Negative,
        Self::Free,
        Self::Sos1,
        Self::Sos2,
        Self::Semicont,
        Self::Semiint,
    ];

    /// Decode the type stored in a variable symbol's user info.
    #[must_use]
    pub fn from_user_info(user_info: i32) -> Option<Self> {
        usize::try_from(fix_var_type(user_info))
            .ok()
            .map(|idx| Self::ALL[idx])
    }

    #[must_use]
    pub const fn text(self) -> &'static str {
        GMS_VAR_TYPE_TEXT[self as usize]
    }

    #[must_use]
    pub const fn default_record(self) -> [f64; GMS_VAL_MAX] {
        GMS_DEF_REC_VAR[self as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EquationType {
    /// `=e=`
    E = 0,
    /// `=g=`
    G,
    /// `=l=`
    L,
    /// `=n=`
    N,
    /// `=x=`
    X,
    /// `=c=`
    C,
    /// `=b=`
    B,
}

impl EquationType {
    pub const ALL: [Self; GMS_EQUTYPE_MAX] =
        [Self::E, Self::G, Self::L, Self::N, Self::X, Self::C, Self::B];

    /// Decode the type stored in an equation symbol's user info.
    #[must_use]
    pub fn from_user_info(user_info: i32) -> Option<Self> {
        usize::try_from(fix_equ_type(user_info))
            .ok()
            .map(|idx| Self::ALL[idx])
    }

    #[must_use]
    pub const fn default_record(self) -> [f64; GMS_VAL_MAX] {
        GMS_DEF_REC_EQU[self as usize]
    }
}

// ---------------------------------------------------------------------------
// User-info decoders
// ---------------------------------------------------------------------------

/// Extract an equation type in `[0, GMS_EQUTYPE_MAX)` from the user info
/// stored for an equation symbol, or [`GMS_TYPE_NOT_STORED`].
#[must_use]
pub const fn fix_equ_type(user_info: i32) -> i32 {
    let equ_type = user_info.wrapping_sub(GMS_EQU_USERINFO_BASE);
    if equ_type < 0 || equ_type >= GMS_EQUTYPE_MAX as i32 {
        GMS_TYPE_NOT_STORED
    } else {
        equ_type
    }
}

/// Extract a variable type in `[0, GMS_VARTYPE_MAX)` from the user info
/// stored for a variable symbol, or [`GMS_TYPE_NOT_STORED`].
#[must_use]
pub const fn fix_var_type(user_info: i32) -> i32 {
    if user_info < 0 || user_info >= GMS_VARTYPE_MAX as i32 {
        GMS_TYPE_NOT_STORED
    } else {
        user_info
    }
}

/// Look up a label in one of the text tables by integer code.
#[must_use]
pub fn label(table: &[&'static str], code: i32) -> Option<&'static str> {
    usize::try_from(code).ok().and_then(|i| table.get(i).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equ_type_decodes_every_in_range_tag() {
        for k in 0..GMS_EQUTYPE_MAX as i32 {
            assert_eq!(fix_equ_type(GMS_EQU_USERINFO_BASE + k), k);
        }
    }

    #[test]
    fn equ_type_rejects_out_of_range_tags() {
        assert!(fix_equ_type(GMS_EQU_USERINFO_BASE + GMS_EQUTYPE_MAX as i32) < 0);
        assert!(fix_equ_type(i32::MAX) < 0);
        assert!(fix_equ_type(0) < 0);
        assert!(fix_equ_type(i32::MIN) < 0);
    }

    #[test]
    fn var_type_decodes_and_rejects() {
        for k in 0..GMS_VARTYPE_MAX as i32 {
            assert_eq!(fix_var_type(k), k);
        }
        assert!(fix_var_type(GMS_VARTYPE_MAX as i32) < 0);
        assert!(fix_var_type(-3) < 0);
    }

    #[test]
    fn typed_decoders() {
        assert_eq!(
            EquationType::from_user_info(GMS_EQU_USERINFO_BASE + 2),
            Some(EquationType::L)
        );
        assert_eq!(EquationType::from_user_info(GMS_EQU_USERINFO_BASE - 1), None);
        assert_eq!(VariableType::from_user_info(5), Some(VariableType::Free));
        assert_eq!(VariableType::from_user_info(10), None);
    }

    #[test]
    fn default_records_use_infinity_sentinels() {
        assert_eq!(VariableType::Free.default_record()[2], GMS_SV_MINF);
        assert_eq!(VariableType::Free.default_record()[3], GMS_SV_PINF);
        assert_eq!(VariableType::Binary.default_record()[3], 1.0);
        assert_eq!(EquationType::G.default_record()[3], GMS_SV_PINF);
        assert_eq!(EquationType::L.default_record()[2], GMS_SV_MINF);
        for row in GMS_DEF_REC_VAR.iter().chain(GMS_DEF_REC_EQU.iter()) {
            assert_eq!(row[4], 1.0);
        }
    }

    #[test]
    fn text_tables() {
        assert_eq!(VariableType::Semiint.text(), "Semiint");
        assert_eq!(label(&GMS_GDX_TYPE_TEXT, 4), Some("Alias"));
        assert_eq!(label(&GMS_SV_TEXT, 2), Some("+Inf"));
        assert_eq!(label(&GMS_VAL_TYPE_TEXT, 5), None);
        assert_eq!(label(&RC_STAT, -1), None);
        assert!(SOLVE_STATUS_TXT.iter().all(|s| s.len() == 24));
        assert!(MODEL_STATUS_TXT.iter().all(|s| s.len() == 24));
        assert_eq!(MODEL_STATUS_TXT[19].trim_end(), "Infeasible - No Solution");
    }
}
