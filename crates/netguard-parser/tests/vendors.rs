//! Realistic configurations for several dialects, checked as outlines.

use netguard_model::outline;
use netguard_parser::{parse, presets};

fn parse_outline(preset: &str, text: &str) -> String {
    let schema = presets::lookup(preset).expect("preset");
    outline(&parse(text, &schema))
}

#[test]
fn cisco_ios_running_config() {
    let text = r#"!
! Last configuration change at 10:15:02 UTC
version 15.2
hostname edge-1
!
banner motd ^C
  Authorized access only
^C
!
interface GigabitEthernet0/1
 description "uplink to core"
 switchport mode trunk
 switchport nonegotiate
!
router bgp 65000
 neighbor 10.0.0.2 remote-as 65001
 address-family ipv4
  network 10.1.0.0 mask 255.255.0.0
 exit-address-family
!
line vty 0 4
 transport input ssh
end
"#;
    insta::assert_snapshot!(parse_outline("cisco-ios", text), @r#"
    version 15.2
    hostname edge-1
    banner motd ^C Authorized access only ^C
    interface GigabitEthernet0/1/
      description "uplink to core"
      switchport mode trunk
      switchport nonegotiate
    router bgp 65000/
      neighbor 10.0.0.2 remote-as 65001
      address-family ipv4/
        network 10.1.0.0 mask 255.255.0.0
    line vty 0 4/
      transport input ssh
    "#);
}

#[test]
fn juniper_junos_hierarchy() {
    let text = r#"## Last commit: 2024-01-01 by admin
system {
    host-name mx1; # inline note
    services {
        ssh {
            root-login deny;
        }
        telnet;
    }
}
/* management */
interfaces {
    ge-0/0/0 {
        unit 0 {
            family inet {
                address 192.0.2.1/24;
            }
        }
    }
}
"#;
    insta::assert_snapshot!(parse_outline("juniper-junos", text), @r"
    system/
      host-name mx1
      services/
        ssh/
          root-login deny
        telnet
    interfaces/
      ge-0/0/0/
        unit 0/
          family inet/
            address 192.0.2.1/24
    ");
}

#[test]
fn fortios_policy_table() {
    let text = r#"#config-version=FGT60F-7.2.5
config system global
    set hostname "fw-1"
    set admintimeout 5
end
config firewall policy
    edit 1
        set name "allow-web"
        set srcintf "lan"
        set action accept
    next
end
"#;
    insta::assert_snapshot!(parse_outline("fortios", text), @r#"
    config system global/
      set hostname "fw-1"
      set admintimeout 5
    config firewall policy/
      edit 1/
        set name "allow-web"
        set srcintf "lan"
        set action accept
    "#);
}

#[test]
fn huawei_vrp_blocks() {
    let text = r#"#
sysname CORE-1
#
interface GigabitEthernet0/0/1
 port link-type trunk
 undo shutdown
#
return
"#;
    insta::assert_snapshot!(parse_outline("huawei", text), @r"
    sysname CORE-1
    interface GigabitEthernet0/0/1/
      port link-type trunk
      undo shutdown
    ");
}

#[test]
fn extreme_voss_keyword_blocks() {
    let text = r#"prompt "VSP"
interface GigabitEthernet 1/1
name "uplink"
no shutdown
exit
vlan create 10 type port-mstprstp 0
end
"#;
    insta::assert_snapshot!(parse_outline("voss", text), @r#"
    prompt "VSP"
    interface GigabitEthernet 1/1/
      name "uplink"
      no shutdown
    vlan create 10 type port-mstprstp 0
    "#);
}

#[test]
fn vyos_braces_without_semicolons() {
    let text = r#"interfaces {
    ethernet eth0 {
        address 192.0.2.10/24
        description "WAN"
    }
}
// Warning: Do not remove the following line.
/* === vyatta-config-version: "system@21" === */
"#;
    insta::assert_snapshot!(parse_outline("vyos", text), @r#"
    interfaces/
      ethernet eth0/
        address 192.0.2.10/24
        description "WAN"
    "#);
}

#[test]
fn cumulus_ifupdown_stanzas() {
    let text = "auto swp1\niface swp1\n    mtu 9216\n    bridge-vids 10 20\n";
    let forest = parse(text, &presets::lookup("cumulus").expect("preset"));
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[1].id, "iface swp1");
    assert_eq!(forest[1].children.len(), 2);
    assert_eq!(forest[1].children[1].params, vec!["bridge-vids", "10", "20"]);
}

#[test]
fn custom_descriptor_from_toml() {
    let schema: netguard_parser::SchemaDescriptor = toml::from_str(
        r#"
vendor = "lab-os"
comment_prefixes = [";"]
terminators = ["leave"]
style = { kind = "keywords", blocks = [{ open = "begin", close = "finish" }] }
"#,
    )
    .expect("descriptor");
    let forest = parse("; header\nbegin zone a\nallow x\nleave\nfinish\n", &schema);
    assert_eq!(outline(&forest), "begin zone a/\n  allow x\n");
    assert_eq!(forest[0].vendor.as_deref(), Some("lab-os"));
}
