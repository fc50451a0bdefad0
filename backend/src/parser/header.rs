//! Header normalization and the field synonym table.
//!
//! Two vocabularies live here. [`REQUIRED_HEADERS`] is the literal header
//! list a plan template carries; it drives sheet/header-row detection and
//! the missing-header warning. [`CanonicalField`] with its alias lists
//! drives per-row value lookup and tolerates renamed columns.

/// Headers a plan template is expected to carry, spelled exactly.
pub const REQUIRED_HEADERS: [&str; 12] = [
    "Hub Office",
    "State",
    "Locality",
    "Site Name",
    "CP Name",
    "Activity at Site",
    "Monitoring By",
    "Survey under Master tool",
    "Use Market Diversion Monitoring",
    "Use Warehouse Monitoring",
    "Visit Date",
    "Comments",
];

/// Lowercase and keep only `[a-z0-9]`.
///
/// `"Site Name:"`, `"site_name"` and `"SITE NAME"` all become `"sitename"`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Number of cells in `row` whose normalized text is one of `vocabulary`.
///
/// `vocabulary` must already be normalized.
pub fn score_header_row<S: AsRef<str>>(row: &[S], vocabulary: &[String]) -> usize {
    row.iter()
        .map(|cell| normalize_header(cell.as_ref()))
        .filter(|n| !n.is_empty() && vocabulary.contains(n))
        .count()
}

/// [`REQUIRED_HEADERS`], normalized.
pub fn normalized_required_headers() -> Vec<String> {
    REQUIRED_HEADERS.iter().map(|h| normalize_header(h)).collect()
}

/// True if the header holds a visit date, for cell formatting purposes.
pub fn is_date_header(header: &str) -> bool {
    matches!(normalize_header(header).as_str(), "visitdate" | "date")
}

// =============================================================================
// Canonical Fields
// =============================================================================

/// Business fields resolved through the synonym table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    HubOffice,
    State,
    Locality,
    SiteName,
    SiteCode,
    CpName,
    ActivityAtSite,
    ActivityDetails,
    VisitBy,
    ToolToBeUsed,
    VisitDate,
}

impl CanonicalField {
    /// The fields every data row must fill in, in reporting order.
    pub const REQUIRED: [CanonicalField; 10] = [
        CanonicalField::HubOffice,
        CanonicalField::State,
        CanonicalField::Locality,
        CanonicalField::SiteName,
        CanonicalField::SiteCode,
        CanonicalField::CpName,
        CanonicalField::ActivityAtSite,
        CanonicalField::ActivityDetails,
        CanonicalField::VisitBy,
        CanonicalField::ToolToBeUsed,
    ];

    /// Fields making up the composite duplicate-site key.
    pub const COMPOSITE_KEY: [CanonicalField; 5] = [
        CanonicalField::HubOffice,
        CanonicalField::State,
        CanonicalField::Locality,
        CanonicalField::SiteName,
        CanonicalField::CpName,
    ];

    /// camelCase key used in configuration and logs.
    pub fn key(self) -> &'static str {
        match self {
            CanonicalField::HubOffice => "hubOffice",
            CanonicalField::State => "state",
            CanonicalField::Locality => "locality",
            CanonicalField::SiteName => "siteName",
            CanonicalField::SiteCode => "siteCode",
            CanonicalField::CpName => "cpName",
            CanonicalField::ActivityAtSite => "activityAtSite",
            CanonicalField::ActivityDetails => "activityDetails",
            CanonicalField::VisitBy => "visitBy",
            CanonicalField::ToolToBeUsed => "toolToBeUsed",
            CanonicalField::VisitDate => "visitDate",
        }
    }

    /// Human-readable label used in issue messages.
    pub fn label(self) -> &'static str {
        match self {
            CanonicalField::HubOffice => "Hub Office",
            CanonicalField::State => "State",
            CanonicalField::Locality => "Locality",
            CanonicalField::SiteName => "Site Name",
            CanonicalField::SiteCode => "Site ID",
            CanonicalField::CpName => "CP Name",
            CanonicalField::ActivityAtSite => "Activity at Site",
            CanonicalField::ActivityDetails => "Activity Details",
            CanonicalField::VisitBy => "Visit By",
            CanonicalField::ToolToBeUsed => "Tool to be used",
            CanonicalField::VisitDate => "Visit Date",
        }
    }

    /// Normalized header spellings accepted for this field, preferred first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::HubOffice => &["huboffice", "hub", "hubname", "office"],
            CanonicalField::State => &["state", "statename"],
            CanonicalField::Locality => &["locality", "localityname", "county"],
            CanonicalField::SiteName => &["sitename", "site", "facilityname", "facility"],
            CanonicalField::SiteCode => &["sitecode", "siteid", "facilitycode", "facilityid"],
            CanonicalField::CpName => &[
                "cpname",
                "cooperatingpartner",
                "cooperatingpartnername",
                "partnername",
                "partner",
            ],
            CanonicalField::ActivityAtSite => &[
                "activityatsite",
                "activityatthesite",
                "siteactivity",
                "activity",
            ],
            CanonicalField::ActivityDetails => &[
                "activitydetails",
                "mainactivity",
                "activitydescription",
                "details",
            ],
            CanonicalField::VisitBy => &["visitby", "monitoringby", "monitoredby", "visittype"],
            CanonicalField::ToolToBeUsed => &[
                "tooltobeused",
                "surveyundermastertool",
                "surveytool",
                "tool",
            ],
            CanonicalField::VisitDate => &["visitdate", "date", "dateofvisit", "planneddate"],
        }
    }

    /// Resolve a header to its canonical field, if any alias matches.
    pub fn from_header(header: &str) -> Option<Self> {
        let normalized = normalize_header(header);
        Self::REQUIRED
            .iter()
            .chain(std::iter::once(&CanonicalField::VisitDate))
            .copied()
            .find(|field| field.aliases().contains(&normalized.as_str()))
    }
}

/// Column indices that feed each canonical field, in alias preference order.
///
/// Built once per file so per-row lookup is a couple of index reads.
#[derive(Debug, Clone)]
pub struct FieldColumns {
    columns: Vec<(CanonicalField, Vec<usize>)>,
}

impl FieldColumns {
    pub fn new(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let fields = CanonicalField::REQUIRED
            .iter()
            .chain(std::iter::once(&CanonicalField::VisitDate));

        let columns = fields
            .map(|&field| {
                let mut indices = Vec::new();
                for alias in field.aliases() {
                    for (idx, header) in normalized.iter().enumerate() {
                        if header == alias && !indices.contains(&idx) {
                            indices.push(idx);
                        }
                    }
                }
                (field, indices)
            })
            .collect();

        Self { columns }
    }

    fn indices(&self, field: CanonicalField) -> &[usize] {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, idx)| idx.as_slice())
            .unwrap_or(&[])
    }

    /// True if any header in the file resolves to `field`.
    pub fn has(&self, field: CanonicalField) -> bool {
        !self.indices(field).is_empty()
    }

    /// First non-blank value for `field` in `row`, trimmed; empty if none.
    pub fn value<'r>(&self, field: CanonicalField, row: &'r [String]) -> &'r str {
        self.indices(field)
            .iter()
            .filter_map(|&idx| row.get(idx))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }
}
