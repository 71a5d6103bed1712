use crate::type_handler::TypeHandler;
use crate::value::ValueType;
use std::fmt;
use std::str::FromStr;

macro_rules! jdbc_types {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// SQL type names accepted by `jdbcType=` (case-sensitive).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum JdbcType {
            $($variant),*
        }

        impl JdbcType {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(JdbcType::$variant => $name),*
                }
            }
        }

        impl FromStr for JdbcType {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(JdbcType::$variant),)*
                    other => Err(format!("unknown jdbcType '{other}'")),
                }
            }
        }
    };
}

jdbc_types! {
    Array => "ARRAY",
    Bit => "BIT",
    TinyInt => "TINYINT",
    SmallInt => "SMALLINT",
    Integer => "INTEGER",
    BigInt => "BIGINT",
    Float => "FLOAT",
    Real => "REAL",
    Double => "DOUBLE",
    Numeric => "NUMERIC",
    Decimal => "DECIMAL",
    Char => "CHAR",
    VarChar => "VARCHAR",
    LongVarChar => "LONGVARCHAR",
    Date => "DATE",
    Time => "TIME",
    Timestamp => "TIMESTAMP",
    Binary => "BINARY",
    VarBinary => "VARBINARY",
    LongVarBinary => "LONGVARBINARY",
    Null => "NULL",
    Other => "OTHER",
    Blob => "BLOB",
    Clob => "CLOB",
    Boolean => "BOOLEAN",
    Cursor => "CURSOR",
    Undefined => "UNDEFINED",
    NVarChar => "NVARCHAR",
    NChar => "NCHAR",
    NClob => "NCLOB",
    Struct => "STRUCT",
    JavaObject => "JAVA_OBJECT",
    Distinct => "DISTINCT",
    Ref => "REF",
    DataLink => "DATALINK",
    RowId => "ROWID",
    LongNVarChar => "LONGNVARCHAR",
    SqlXml => "SQLXML",
    DateTimeOffset => "DATETIMEOFFSET",
    TimeWithTimezone => "TIME_WITH_TIMEZONE",
    TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a stored-procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    #[default]
    In,
    Out,
    InOut,
}

impl FromStr for ParameterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(ParameterMode::In),
            "OUT" => Ok(ParameterMode::Out),
            "INOUT" => Ok(ParameterMode::InOut),
            other => Err(format!("unknown parameter mode '{other}'")),
        }
    }
}

impl ParameterMode {
    /// Whether a value is sent for this parameter.
    pub fn is_input(self) -> bool {
        matches!(self, ParameterMode::In | ParameterMode::InOut)
    }
}

/// One resolved `#{...}` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapping {
    pub property: String,
    pub value_type: ValueType,
    pub jdbc_type: Option<JdbcType>,
    pub jdbc_type_name: Option<String>,
    pub mode: ParameterMode,
    pub numeric_scale: Option<u32>,
    pub result_map: Option<String>,
    pub type_handler: TypeHandler,
}

impl ParameterMapping {
    /// A mapping with default attributes.
    pub fn new(property: impl Into<String>, value_type: ValueType, type_handler: TypeHandler) -> Self {
        Self {
            property: property.into(),
            value_type,
            jdbc_type: None,
            jdbc_type_name: None,
            mode: ParameterMode::In,
            numeric_scale: None,
            result_map: None,
            type_handler,
        }
    }
}
