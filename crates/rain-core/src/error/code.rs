use thiserror::Error;

/// Error codes for diagnostics.
///
/// Codes group by hundreds: E0xx lexical, E1xx parse, E2xx opcode metadata,
/// E3xx operand resolution, E4xx bytecode codec.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Error)]
pub enum ErrorCode {
    // Lexical errors (E001-E099)
    #[error("unrecognized token")]
    E001,
    #[error("unterminated comment")]
    E002,

    // Parse errors (E100-E199)
    #[error("source item expressions must end with semi")]
    E100,
    #[error("invalid rain expression")]
    E101,
    #[error("no LHS item exists to match this RHS item")]
    E102,
    #[error("no RHS item exists to match this LHS item")]
    E103,
    #[error("invalid LHS alias")]
    E104,
    #[error("invalid operand args")]
    E105,
    #[error("unknown opcode")]
    E106,
    #[error("undefined alias")]
    E107,
    #[error("invalid number of inputs")]
    E108,

    // Op meta errors (E200-E299)
    #[error("expected op meta")]
    E200,
    #[error("op meta must be in valid bytes form")]
    E201,
    #[error("incorrect header check")]
    E202,
    #[error("invalid op meta")]
    E203,
    #[error("bad operand args order")]
    E204,
    #[error("unresolvable meta hash")]
    E205,

    // Operand resolution errors (E300-E399)
    #[error("invalid/corrupt operand or operand arguments in opmeta")]
    E300,

    // Bytecode codec errors (E400-E499)
    #[error("opcode index out of range")]
    E400,
    #[error("malformed bytecode")]
    E401,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E102").
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::E107 => "E107",
            ErrorCode::E108 => "E108",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E300 => "E300",
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
        }
    }

    /// Get the default message for the error.
    pub fn message(self) -> String {
        self.to_string()
    }
}
