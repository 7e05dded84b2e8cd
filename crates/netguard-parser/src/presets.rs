use crate::schema::{BlockStyle, KeywordBlock, SchemaDescriptor};

/// Canonical names of the shipped dialects.
const CANONICAL: &[&str] = &[
    "cisco-ios",
    "cisco-nxos",
    "cisco-iosxr",
    "arista-eos",
    "juniper-junos",
    "juniper-set",
    "huawei-vrp",
    "nokia-sros",
    "mikrotik-routeros",
    "vyos",
    "fortios",
    "paloalto-panos",
    "extreme-exos",
    "extreme-voss",
    "cumulus-linux",
    "aruba-aoscx",
];

const ALIASES: &[(&str, &str)] = &[
    ("cisco", "cisco-ios"),
    ("ios", "cisco-ios"),
    ("nxos", "cisco-nxos"),
    ("nx-os", "cisco-nxos"),
    ("iosxr", "cisco-iosxr"),
    ("ios-xr", "cisco-iosxr"),
    ("arista", "arista-eos"),
    ("eos", "arista-eos"),
    ("juniper", "juniper-junos"),
    ("junos", "juniper-junos"),
    ("junos-set", "juniper-set"),
    ("huawei", "huawei-vrp"),
    ("vrp", "huawei-vrp"),
    ("nokia", "nokia-sros"),
    ("sros", "nokia-sros"),
    ("timos", "nokia-sros"),
    ("mikrotik", "mikrotik-routeros"),
    ("routeros", "mikrotik-routeros"),
    ("fortinet", "fortios"),
    ("fortigate", "fortios"),
    ("paloalto", "paloalto-panos"),
    ("panos", "paloalto-panos"),
    ("pan-os", "paloalto-panos"),
    ("exos", "extreme-exos"),
    ("voss", "extreme-voss"),
    ("cumulus", "cumulus-linux"),
    ("aruba", "aruba-aoscx"),
    ("aoscx", "aruba-aoscx"),
    ("aos-cx", "aruba-aoscx"),
];

pub fn available() -> &'static [&'static str] {
    CANONICAL
}

/// Resolve a preset name or alias (case-insensitive) to its canonical name.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    CANONICAL
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(name))
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                .map(|(_, canonical)| *canonical)
        })
}

/// Look up a shipped dialect by name or alias.
pub fn lookup(name: &str) -> Option<SchemaDescriptor> {
    let schema = match canonical_name(name)? {
        "cisco-ios" => cisco_like("cisco-ios", &["end", "exit", "exit-address-family"]),
        "cisco-nxos" => cisco_like("cisco-nxos", &["end", "exit"]).with_comments(&["!", "#"]),
        "cisco-iosxr" => cisco_like("cisco-iosxr", &["end", "exit", "root"]),
        "arista-eos" => cisco_like("arista-eos", &["end", "exit"]),
        "aruba-aoscx" => cisco_like("aruba-aoscx", &["end", "exit"]),
        "juniper-junos" => SchemaDescriptor::new("juniper-junos", BlockStyle::Braces)
            .with_comments(&["#"])
            .with_inline_comments()
            .with_block_comment("/*", "*/")
            .with_escape('\\'),
        "juniper-set" => SchemaDescriptor::new("juniper-set", BlockStyle::Indent)
            .with_comments(&["#"])
            .with_escape('\\'),
        "huawei-vrp" => SchemaDescriptor::new("huawei-vrp", BlockStyle::Indent)
            .with_comments(&["#"])
            .with_terminators(&["return", "quit"]),
        "nokia-sros" => SchemaDescriptor::new("nokia-sros", BlockStyle::Indent)
            .with_comments(&["#"])
            .with_terminators(&["exit", "exit all"]),
        "mikrotik-routeros" => SchemaDescriptor::new(
            "mikrotik-routeros",
            BlockStyle::Sections {
                header_prefix: "/".to_string(),
            },
        )
        .with_comments(&["#"])
        .with_escape('\\')
        .with_continuation("\\"),
        "vyos" => SchemaDescriptor::new("vyos", BlockStyle::Braces)
            .with_comments(&["#", "//"])
            .with_block_comment("/*", "*/")
            .with_escape('\\'),
        "fortios" => SchemaDescriptor::new(
            "fortios",
            BlockStyle::Keywords {
                blocks: vec![
                    KeywordBlock::new("config", "end"),
                    KeywordBlock::new("edit", "next"),
                ],
            },
        )
        .with_comments(&["#"])
        .with_quotes(&['"', '\''])
        .with_escape('\\')
        .with_multiline_quotes(),
        "paloalto-panos" => SchemaDescriptor::new("paloalto-panos", BlockStyle::Braces)
            .with_comments(&["#"])
            .with_block_comment("/*", "*/")
            .with_quotes(&['"', '\''])
            .with_escape('\\')
            .with_multiline_quotes(),
        "extreme-exos" => {
            SchemaDescriptor::new("extreme-exos", BlockStyle::Indent).with_comments(&["#"])
        }
        "extreme-voss" => SchemaDescriptor::new(
            "extreme-voss",
            BlockStyle::Keywords {
                blocks: ["interface", "router", "application", "i-sid", "logical-intf"]
                    .iter()
                    .map(|open| KeywordBlock::new(open, "exit"))
                    .collect(),
            },
        )
        .with_comments(&["#"])
        .with_terminators(&["end"]),
        "cumulus-linux" => {
            SchemaDescriptor::new("cumulus-linux", BlockStyle::Indent).with_comments(&["#"])
        }
        _ => return None,
    };
    Some(schema)
}

fn cisco_like(vendor: &str, terminators: &[&str]) -> SchemaDescriptor {
    SchemaDescriptor::new(vendor, BlockStyle::Indent)
        .with_comments(&["!"])
        .with_terminators(terminators)
        .with_banners(&["banner"])
}
