use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::prelude::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => bail!("unknown theme `{s}`"),
        }
    }
}
