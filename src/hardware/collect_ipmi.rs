use crate::error::CollectionError;
use crate::hardware::context::RunContext;
use crate::hardware::types::IpmiInfo;
use crate::parsers::fields;

const UNKNOWN: &str = "unknown";

/// BMC LAN configuration from `ipmitool lan print`.
pub fn collect_ipmi_info(ctx: &mut RunContext) -> Result<IpmiInfo, CollectionError> {
    let lan = ctx.ipmi_lan();
    let attr = |key: &str| fields::field_token(lan, key).unwrap_or_else(|| UNKNOWN.to_string());

    Ok(IpmiInfo {
        address: attr("IP Address"),
        netmask: attr("Subnet Mask"),
        mac: attr("MAC Address"),
        gateway: attr("Default Gateway IP"),
    })
}
