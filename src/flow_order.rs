//! The ordered sequence of OAuth flows the orchestrator tries, in order, for a given account.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One OAuth grant type the orchestrator knows how to drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// `grant_type=refresh_token`
    Refresh,
    /// `grant_type=password`
    Password,
    /// `grant_type=authorization_code`
    Code,
    /// `grant_type=urn:ietf:params:oauth:grant-type:device_code`
    Device,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Flow::Refresh => "refresh",
            Flow::Password => "password",
            Flow::Code => "code",
            Flow::Device => "device",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a flow name does not match one of the four known grant types.
#[derive(Debug, thiserror::Error)]
#[error("unknown flow name `{0}`, expected one of refresh, password, code, device")]
pub struct UnknownFlowError(String);

impl FromStr for Flow {
    type Err = UnknownFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "refresh" => Ok(Flow::Refresh),
            "password" => Ok(Flow::Password),
            "code" => Ok(Flow::Code),
            "device" => Ok(Flow::Device),
            other => Err(UnknownFlowError(other.to_owned())),
        }
    }
}

/// An ordered, duplicate-free sequence of [`Flow`]s. The default order is exactly
/// `[refresh, password, code, device]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FlowOrderWire", into = "FlowOrderWire")]
pub struct FlowOrder(Vec<Flow>);

impl Default for FlowOrder {
    fn default() -> Self {
        FlowOrder(vec![Flow::Refresh, Flow::Password, Flow::Code, Flow::Device])
    }
}

impl FlowOrder {
    /// Build a flow order from an explicit sequence, rejecting duplicates.
    pub fn new(flows: Vec<Flow>) -> Result<Self, DuplicateFlowError> {
        let mut seen = std::collections::HashSet::new();
        for flow in &flows {
            if !seen.insert(*flow) {
                return Err(DuplicateFlowError(*flow));
            }
        }
        Ok(FlowOrder(flows))
    }

    /// Parse the bare comma-separated form accepted by CLI flags, config scalars, and the
    /// `OIDC_AGENT_DEFAULT_FLOW_ORDER` environment variable (e.g. `"refresh,device"`).
    pub fn parse_bare(s: &str) -> Result<Self, String> {
        let flows = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.trim().parse::<Flow>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        FlowOrder::new(flows).map_err(|e| e.to_string())
    }

    /// Iterate over the flows in order.
    pub fn iter(&self) -> impl Iterator<Item = Flow> + '_ {
        self.0.iter().copied()
    }
}

/// Error returned when a flow order contains the same flow more than once.
#[derive(Debug, thiserror::Error)]
#[error("flow `{0}` appears more than once in the flow order")]
pub struct DuplicateFlowError(Flow);

/// Accepts either a bracketed array of flow names or a single comma-separated bare string
/// (e.g. `"refresh,password"` as used by CLI flags and config-file scalars), matching the
/// source's list-shaped-or-bare-name parsing for this field.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FlowOrderWire {
    List(Vec<Flow>),
    Bare(String),
}

impl TryFrom<FlowOrderWire> for FlowOrder {
    type Error = String;

    fn try_from(wire: FlowOrderWire) -> Result<Self, Self::Error> {
        match wire {
            FlowOrderWire::List(flows) => FlowOrder::new(flows).map_err(|e| e.to_string()),
            FlowOrderWire::Bare(s) => FlowOrder::parse_bare(&s),
        }
    }
}

impl From<FlowOrder> for FlowOrderWire {
    fn from(order: FlowOrder) -> Self {
        FlowOrderWire::List(order.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_order() {
        let order = FlowOrder::default();
        let flows: Vec<Flow> = order.iter().collect();
        assert_eq!(flows, vec![Flow::Refresh, Flow::Password, Flow::Code, Flow::Device]);
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = FlowOrder::new(vec![Flow::Refresh, Flow::Refresh]);
        assert!(err.is_err());
    }

    #[test]
    fn test_bare_string_parses() {
        let order: FlowOrder = serde_json::from_str("\"refresh,device\"").unwrap();
        let flows: Vec<Flow> = order.iter().collect();
        assert_eq!(flows, vec![Flow::Refresh, Flow::Device]);
    }

    #[test]
    fn test_json_array_parses() {
        let order: FlowOrder = serde_json::from_str(r#"["password", "code"]"#).unwrap();
        let flows: Vec<Flow> = order.iter().collect();
        assert_eq!(flows, vec![Flow::Password, Flow::Code]);
    }

    #[test]
    fn test_rejects_unknown_name() {
        let result: Result<FlowOrder, _> = serde_json::from_str("\"bogus\"");
        assert!(result.is_err());
    }
}
