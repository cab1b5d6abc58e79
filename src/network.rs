//! Network codes recognised in DMG station lines.
//!
//! DMG files rarely carry an FDSN network code. When a station line names a
//! known code, the trace gets that code and a provenance string built from
//! the operating network and institution; otherwise the network is the
//! placeholder `ZZ` and the provenance is empty.

/// Placeholder network code for stations with no recognised network.
pub const UNKNOWN_NETWORK: &str = "ZZ";

/// A known network: code, network name, operating institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    pub code: &'static str,
    pub name: &'static str,
    pub institution: &'static str,
}

impl Network {
    /// Provenance string: `"<network name>, <institution>"`.
    pub fn source(&self) -> String {
        format!("{}, {}", self.name, self.institution)
    }
}

const NETWORKS: &[Network] = &[
    Network {
        code: "AZ",
        name: "ANZA Regional Network",
        institution: "University of California, San Diego",
    },
    Network {
        code: "BK",
        name: "Berkeley Digital Seismic Network",
        institution: "University of California, Berkeley",
    },
    Network {
        code: "CE",
        name: "California Strong Motion Instrumentation Program",
        institution: "California Geological Survey",
    },
    Network {
        code: "CI",
        name: "Southern California Seismic Network",
        institution: "California Institute of Technology (Caltech)",
    },
    Network {
        code: "NC",
        name: "Northern California Seismic Network",
        institution: "U.S. Geological Survey",
    },
    Network {
        code: "NP",
        name: "National Strong Motion Project",
        institution: "U.S. Geological Survey",
    },
    Network {
        code: "US",
        name: "United States National Seismic Network",
        institution: "U.S. Geological Survey",
    },
    Network {
        code: "UW",
        name: "Pacific Northwest Seismic Network",
        institution: "University of Washington",
    },
];

/// Look up a network by its two-character code (case-insensitive).
pub fn lookup(code: &str) -> Option<&'static Network> {
    let code = code.trim();
    NETWORKS.iter().find(|n| n.code.eq_ignore_ascii_case(code))
}

/// Resolve an optional network token to `(code, source)`.
pub fn resolve(code: Option<&str>) -> (String, String) {
    match code.and_then(lookup) {
        Some(network) => (network.code.to_string(), network.source()),
        None => (UNKNOWN_NETWORK.to_string(), String::new()),
    }
}
