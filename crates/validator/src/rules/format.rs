//! Text format rules backed by regular expressions.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::{BindError, Check, Rule, check, require_no_param, require_string};
use crate::value::{FieldKind, Value};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap()
});

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/$.?#][^\s]*$").unwrap());

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static HEXCOLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

/// 0-255.
const BYTE: &str = r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])";
/// 0%-100%.
const PERCENT: &str = r"(?:100|[1-9]?[0-9])%";
/// 0-360.
const HUE: &str = r"(?:360|3[0-5][0-9]|[12][0-9]{2}|[1-9]?[0-9])";
/// 0-1 with optional fraction.
const ALPHA: &str = r"(?:0|1|0?\.[0-9]+|1\.0+)";

static RGB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^rgb\(\s*(?:{BYTE}\s*,\s*{BYTE}\s*,\s*{BYTE}|{PERCENT}\s*,\s*{PERCENT}\s*,\s*{PERCENT})\s*\)$"
    ))
    .unwrap()
});

static RGBA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^rgba\(\s*(?:{BYTE}\s*,\s*{BYTE}\s*,\s*{BYTE}|{PERCENT}\s*,\s*{PERCENT}\s*,\s*{PERCENT})\s*,\s*{ALPHA}\s*\)$"
    ))
    .unwrap()
});

static HSL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^hsl\(\s*{HUE}\s*,\s*{PERCENT}\s*,\s*{PERCENT}\s*\)$"
    ))
    .unwrap()
});

static HSLA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^hsla\(\s*{HUE}\s*,\s*{PERCENT}\s*,\s*{PERCENT}\s*,\s*{ALPHA}\s*\)$"
    ))
    .unwrap()
});

/// A parameter-less text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Email,
    Url,
    Uuid,
    HexColor,
    Rgb,
    Rgba,
    Hsl,
    Hsla,
}

impl Format {
    pub(crate) const ALL: &'static [Self] = &[
        Self::Email,
        Self::Url,
        Self::Uuid,
        Self::HexColor,
        Self::Rgb,
        Self::Rgba,
        Self::Hsl,
        Self::Hsla,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::HexColor => "hexcolor",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
            Self::Hsl => "hsl",
            Self::Hsla => "hsla",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Email => &EMAIL_REGEX,
            Self::Url => &URL_REGEX,
            Self::Uuid => &UUID_REGEX,
            Self::HexColor => &HEXCOLOR_REGEX,
            Self::Rgb => &RGB_REGEX,
            Self::Rgba => &RGBA_REGEX,
            Self::Hsl => &HSL_REGEX,
            Self::Hsla => &HSLA_REGEX,
        }
    }
}

impl Rule for Format {
    fn bind(&self, param: &str, kind: &FieldKind) -> Result<Arc<dyn Check>, BindError> {
        require_string(kind)?;
        require_no_param(param)?;
        let regex = self.regex();
        Ok(check(move |value| match value {
            Value::Absent => true,
            Value::Str(s) => regex.is_match(s),
            _ => false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Format::Email, "Badger.Smith@gmail.com", true)]
    #[case(Format::Email, "not-an-email", false)]
    #[case(Format::Url, "https://example.com/path?q=1", true)]
    #[case(Format::Url, "example.com", false)]
    #[case(Format::Uuid, "6f1e8c1a-3c1b-4f7e-9a51-2c2b5d6f7a80", true)]
    #[case(Format::Uuid, "6f1e8c1a3c1b4f7e9a512c2b5d6f7a80", false)]
    #[case(Format::HexColor, "#000", true)]
    #[case(Format::HexColor, "#000-", false)]
    #[case(Format::HexColor, "#a1b2c3d4", true)]
    #[case(Format::Rgb, "rgb(255, 0, 10)", true)]
    #[case(Format::Rgb, "rgb(10%,20%,30%)", true)]
    #[case(Format::Rgb, "rgb(256,0,0)", false)]
    #[case(Format::Rgba, "rgba(0,0,0,0.5)", true)]
    #[case(Format::Rgba, "rgba(0,0,0,1.5)", false)]
    #[case(Format::Hsl, "hsl(360, 100%, 50%)", true)]
    #[case(Format::Hsl, "hsl(361, 100%, 50%)", false)]
    #[case(Format::Hsla, "hsla(120,50%,50%,.3)", true)]
    fn formats(#[case] format: Format, #[case] input: &str, #[case] valid: bool) {
        let check = format.bind("", &FieldKind::String).unwrap();
        assert_eq!(check.check(&Value::str(input)), valid, "{input}");
    }

    #[test]
    fn formats_only_bind_to_text() {
        assert!(Format::Email.bind("", &FieldKind::Int).is_err());
        assert!(Format::Uuid.bind("v4", &FieldKind::String).is_err());
    }
}
