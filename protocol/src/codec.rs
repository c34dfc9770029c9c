//! 事件编解码
//!
//! 解码对标签空间是完备的：未知标签返回错误而不是静默丢弃，
//! 这样协议版本不一致能在测试中暴露出来。

use serde_json::Value;

use crate::error::{MalformedMessage, Result};
use crate::message::{GameEvent, ALL_TAGS, TAG_KEY};

/// 编码事件
pub fn encode(event: &GameEvent) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(event)?)
}

/// 解码事件
pub fn decode(bytes: &[u8]) -> Result<GameEvent> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| MalformedMessage::NotARecord {
        reason: e.to_string(),
    })?;

    let Value::Object(record) = &value else {
        return Err(MalformedMessage::NotARecord {
            reason: "expected a JSON object".to_string(),
        }
        .into());
    };

    let tag = match record.get(TAG_KEY) {
        None => return Err(MalformedMessage::MissingTag.into()),
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => {
            return Err(MalformedMessage::NotARecord {
                reason: format!("action tag must be a string, got {other}"),
            }
            .into())
        }
    };

    if !ALL_TAGS.contains(&tag.as_str()) {
        return Err(MalformedMessage::UnknownTag { tag }.into());
    }

    let event: GameEvent =
        serde_json::from_value(value).map_err(|e| MalformedMessage::InvalidPayload {
            tag: tag.clone(),
            reason: e.to_string(),
        })?;

    validate(&event)?;
    Ok(event)
}

/// 检查字段取值范围
fn validate(event: &GameEvent) -> std::result::Result<(), MalformedMessage> {
    if let GameEvent::Roll { dice: (a, b) } = event {
        if !(1..=6).contains(a) || !(1..=6).contains(b) {
            return Err(MalformedMessage::InvalidPayload {
                tag: event.tag().to_string(),
                reason: format!("dice values out of range: ({a}, {b})"),
            });
        }
    }
    Ok(())
}
