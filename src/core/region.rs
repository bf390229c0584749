use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::prelude::*;

/// Swedish electricity price area.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, clap::ValueEnum)]
pub enum Region {
    /// Luleå, northern Sweden.
    #[value(name = "SE1")]
    Se1,

    /// Sundsvall, northern central Sweden.
    #[value(name = "SE2")]
    Se2,

    /// Stockholm, southern central Sweden.
    #[default]
    #[value(name = "SE3")]
    Se3,

    /// Malmö, southern Sweden.
    #[value(name = "SE4")]
    Se4,
}

impl Region {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Se1 => "SE1",
            Self::Se2 => "SE2",
            Self::Se3 => "SE3",
            Self::Se4 => "SE4",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Se1 => "Norrland and northern Sweden: mostly hydro and wind, usually the cheapest",
            Self::Se2 => "Northern central Sweden: good access to hydro and wind",
            Self::Se3 => "Southern central Sweden, the largest area: nuclear and renewables",
            Self::Se4 => "Southern Sweden: depends on imports, often the most expensive",
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SE1" => Ok(Self::Se1),
            "SE2" => Ok(Self::Se2),
            "SE3" => Ok(Self::Se3),
            "SE4" => Ok(Self::Se4),
            _ => bail!("`{s}` is not a Swedish price area"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_ok() -> Result {
        assert_eq!(Region::from_str("SE1")?, Region::Se1);
        assert_eq!(Region::from_str(" se4 ")?, Region::Se4);
        Ok(())
    }

    #[test]
    fn test_from_str_err() {
        assert!(Region::from_str("SE5").is_err());
        assert!(Region::from_str("").is_err());
    }

    #[test]
    fn test_default() {
        assert_eq!(Region::default(), Region::Se3);
    }
}
