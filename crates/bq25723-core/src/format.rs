#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    #[default]
    Hex,
    Binary,
    Decimal,
}

impl std::str::FromStr for ValueFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "hex" => Self::Hex,
            "bin" | "binary" => Self::Binary,
            "dec" | "decimal" => Self::Decimal,
            _ => return Err(()),
        })
    }
}

impl ValueFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Binary => "bin",
            Self::Decimal => "dec",
        }
    }

    pub fn render(&self, value: u16) -> String {
        match self {
            Self::Hex => format!("{value:#06x}"),
            Self::Binary => {
                let [hi, lo] = value.to_be_bytes();
                format!(
                    "0b{:04b}_{:04b}_{:04b}_{:04b}",
                    hi >> 4,
                    hi & 0x0F,
                    lo >> 4,
                    lo & 0x0F
                )
            }
            Self::Decimal => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_format() {
        assert_eq!(ValueFormat::Hex.render(0x1234), "0x1234");
        assert_eq!(ValueFormat::Hex.render(0x0040), "0x0040");
        assert_eq!(ValueFormat::Binary.render(0x1234), "0b0001_0010_0011_0100");
        assert_eq!(ValueFormat::Decimal.render(0x1234), "4660");
    }

    #[test]
    fn parses_names() {
        assert_eq!("HEX".parse(), Ok(ValueFormat::Hex));
        assert_eq!("bin".parse(), Ok(ValueFormat::Binary));
        assert_eq!("decimal".parse(), Ok(ValueFormat::Decimal));
        assert_eq!("octal".parse::<ValueFormat>(), Err(()));
    }
}
