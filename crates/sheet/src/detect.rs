use sheetseek_core::DetectedFields;

/// Lowercase substrings that mark a name-like column.
pub const NAME_INDICATORS: &[&str] = &["name", "fullname", "full name", "full_name"];

/// Lowercase substrings that mark a date-of-birth column.
pub const DOB_INDICATORS: &[&str] = &[
    "dob",
    "dateofbirth",
    "date of birth",
    "birth date",
    "birthdate",
    "date_of_birth",
];

/// Proposes identifying columns from header names.
///
/// Detection is advisory: the resulting fields pre-fill a search form and
/// are always user-overridable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDetector {
    name_indicators: Vec<String>,
    dob_indicators: Vec<String>,
}

impl Default for FieldDetector {
    fn default() -> Self {
        Self::new(NAME_INDICATORS, DOB_INDICATORS)
    }
}

impl FieldDetector {
    /// Create a detector with custom indicator lists. Indicators are
    /// lowercased here so matching stays case-insensitive.
    pub fn new<S: AsRef<str>>(name_indicators: &[S], dob_indicators: &[S]) -> Self {
        Self {
            name_indicators: lowercase_all(name_indicators),
            dob_indicators: lowercase_all(dob_indicators),
        }
    }

    #[must_use]
    pub fn name_indicators(&self) -> &[String] {
        &self.name_indicators
    }

    #[must_use]
    pub fn dob_indicators(&self) -> &[String] {
        &self.dob_indicators
    }

    /// Pick the primary (name-like) and secondary (date-of-birth-like) field.
    ///
    /// Both scans run independently over the headers in order, so a single
    /// header can be chosen twice. Without a match, primary falls back to the
    /// first header and secondary to the second (or the first when there is
    /// only one). An empty header row yields two empty strings.
    #[must_use]
    pub fn detect<S: AsRef<str>>(&self, headers: &[S]) -> DetectedFields {
        let Some(first) = headers.first() else {
            return DetectedFields::default();
        };

        let primary = first_containing(headers, &self.name_indicators).unwrap_or(first.as_ref());
        let secondary = first_containing(headers, &self.dob_indicators)
            .or_else(|| headers.get(1).map(AsRef::as_ref))
            .unwrap_or(first.as_ref());

        DetectedFields {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        }
    }
}

/// Detect fields with the built-in indicator lists.
///
/// # Example
/// ```
/// use sheetseek_sheet::detect_fields;
///
/// let fields = detect_fields(&["Full Name", "Date of Birth", "Email"]);
/// assert_eq!(fields.primary, "Full Name");
/// assert_eq!(fields.secondary, "Date of Birth");
/// ```
#[must_use]
pub fn detect_fields<S: AsRef<str>>(headers: &[S]) -> DetectedFields {
    FieldDetector::default().detect(headers)
}

fn first_containing<'a, S: AsRef<str>>(headers: &'a [S], indicators: &[String]) -> Option<&'a str> {
    headers.iter().map(AsRef::as_ref).find(|header| {
        let lower = header.to_lowercase();
        indicators.iter().any(|ind| lower.contains(ind.as_str()))
    })
}

fn lowercase_all<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|s| s.as_ref().to_lowercase()).collect()
}
