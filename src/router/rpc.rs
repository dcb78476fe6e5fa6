//! ubus JSON-RPC request/response shapes.

use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Counters, UbusError};

/// Session id used before logging in
pub const ANONYMOUS_SESSION: &str = "00000000000000000000000000000000";

pub const STATUS_OK: u64 = 0;
/// ubus `UBUS_STATUS_PERMISSION_DENIED`, returned for expired sessions
pub const STATUS_PERMISSION_DENIED: u64 = 6;
/// rpcd JSON-RPC error for an unknown or timed out session
pub const RPC_ACCESS_DENIED: i64 = -32002;

/// A ubus `call` request: `params` is `[session, object, method, args]`
#[derive(Debug, Serialize)]
pub struct Call<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: (&'a str, &'a str, &'a str, NoArgs),
}

#[derive(Debug, Serialize)]
struct NoArgs {}

impl<'a> Call<'a> {
    pub fn new(id: u32, session: &'a str, object: &'a str, method: &'a str) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: "call",
            params: (session, object, method, NoArgs {}),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Fault {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// One JSON-RPC reply. ubus puts `[status, data]` in `result`.
#[derive(Debug, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub result: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<Fault>,
}

impl Reply {
    /// The data element of a successful call
    pub fn into_payload(self) -> Result<Value, UbusError> {
        if let Some(fault) = self.error {
            return Err(UbusError::Rpc {
                code: fault.code,
                message: fault.message,
            });
        }
        let mut result = self
            .result
            .ok_or_else(|| UbusError::Malformed("reply has no result".into()))?;
        let status = result
            .first()
            .and_then(Value::as_u64)
            .ok_or_else(|| UbusError::Malformed("result has no status code".into()))?;
        if status != STATUS_OK {
            return Err(UbusError::Status(status));
        }
        if result.len() < 2 {
            return Err(UbusError::Malformed("result has no data".into()));
        }
        Ok(result.swap_remove(1))
    }
}

#[derive(Debug, Deserialize)]
struct SessionData {
    sid: String,
}

/// Session id out of an `admb getSid` reply
pub fn parse_session(reply: Reply) -> Result<String, UbusError> {
    let data: SessionData = serde_json::from_value(reply.into_payload()?)
        .map_err(|e| UbusError::Malformed(format!("session reply: {e}")))?;
    Ok(data.sid)
}

#[derive(Debug, Deserialize)]
struct Device {
    #[serde(default)]
    stats: Option<DeviceStats>,
}

#[derive(Debug, Deserialize)]
struct DeviceStats {
    #[serde(deserialize_with = "counter")]
    tx_bytes: u64,
    #[serde(deserialize_with = "counter")]
    rx_bytes: u64,
}

/// Some firmwares encode counters as floats
fn counter<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let n = serde_json::Number::deserialize(d)?;
    n.as_u64()
        .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .ok_or_else(|| D::Error::custom(format!("invalid byte counter {n}")))
}

/// Pull one interface's counters out of a batched `luci-rpc getNetworkDevices` reply
pub fn extract_counters(replies: Vec<Reply>, interface: &str) -> Result<Counters, UbusError> {
    let reply = replies
        .into_iter()
        .next()
        .ok_or_else(|| UbusError::Malformed("empty batch reply".into()))?;
    let devices: HashMap<String, Device> = serde_json::from_value(reply.into_payload()?)
        .map_err(|e| UbusError::Malformed(format!("device list: {e}")))?;
    let device = devices
        .get(interface)
        .ok_or_else(|| UbusError::MissingInterface(interface.to_string()))?;
    let stats = device
        .stats
        .as_ref()
        .ok_or_else(|| UbusError::MissingStats(interface.to_string()))?;
    Ok(Counters {
        tx_bytes: stats.tx_bytes,
        rx_bytes: stats.rx_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn replies(raw: &str) -> Vec<Reply> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn call_serializes_as_ubus_request() {
        let call = Call::new(32, "abc", "luci-rpc", "getNetworkDevices");
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": 32,
                "method": "call",
                "params": ["abc", "luci-rpc", "getNetworkDevices", {}]
            })
        );
    }

    #[test]
    fn session_id_is_read_from_data() {
        let reply: Reply = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":[0,{"sid":"5f2c9a","timeout":300}]}"#,
        )
        .unwrap();
        assert_eq!(parse_session(reply).unwrap(), "5f2c9a");
    }

    #[test]
    fn counters_for_named_interface() {
        let batch = replies(
            r#"[{"jsonrpc":"2.0","id":32,"result":[0,{
                "lan":{"stats":{"tx_bytes":1,"rx_bytes":2}},
                "wan":{"up":true,"stats":{"tx_bytes":123456789012,"rx_bytes":987654321}}
            }]}]"#,
        );
        assert_eq!(
            extract_counters(batch, "wan").unwrap(),
            Counters {
                tx_bytes: 123456789012,
                rx_bytes: 987654321
            }
        );
    }

    #[test]
    fn float_counters_are_accepted() {
        let batch = replies(
            r#"[{"jsonrpc":"2.0","id":32,"result":[0,{"wan":{"stats":{
                "tx_bytes":1.5e3,"rx_bytes":20.0
            }}}]}]"#,
        );
        let counters = extract_counters(batch, "wan").unwrap();
        assert_eq!(counters.tx_bytes, 1500);
        assert_eq!(counters.rx_bytes, 20);
    }

    #[test]
    fn missing_interface_is_reported() {
        let batch = replies(
            r#"[{"jsonrpc":"2.0","id":32,"result":[0,{"lan":{"stats":{
                "tx_bytes":1,"rx_bytes":2
            }}}]}]"#,
        );
        assert!(matches!(
            extract_counters(batch, "wan"),
            Err(UbusError::MissingInterface(name)) if name == "wan"
        ));
    }

    #[test]
    fn missing_stats_is_reported() {
        let batch = replies(r#"[{"jsonrpc":"2.0","id":32,"result":[0,{"wan":{"up":false}}]}]"#);
        assert!(matches!(
            extract_counters(batch, "wan"),
            Err(UbusError::MissingStats(_))
        ));
    }

    #[test]
    fn non_zero_status_is_an_error() {
        let batch = replies(r#"[{"jsonrpc":"2.0","id":32,"result":[6]}]"#);
        assert!(matches!(
            extract_counters(batch, "wan"),
            Err(UbusError::Status(STATUS_PERMISSION_DENIED))
        ));
    }

    #[test]
    fn rpc_fault_is_an_error() {
        let batch = replies(
            r#"[{"jsonrpc":"2.0","id":32,"error":{"code":-32002,"message":"Access denied"}}]"#,
        );
        assert!(matches!(
            extract_counters(batch, "wan"),
            Err(UbusError::Rpc { code: RPC_ACCESS_DENIED, .. })
        ));
    }

    #[test]
    fn empty_batch_is_malformed() {
        assert!(matches!(
            extract_counters(Vec::new(), "wan"),
            Err(UbusError::Malformed(_))
        ));
    }
}
