//! Server-sent-event decoding and the local mirror of the streamed location.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub event: String,
    pub data: String,
}

#[derive(Default)]
pub(crate) struct SseDecoder {
    pending: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);

            if line.is_empty() {
                if let Some(event) = self.flush() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (&*line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        events
    }

    fn flush(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if event.is_none() && self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// Client-side copy of the streamed location, patched by `put`/`patch` events.
#[derive(Debug, Default)]
pub(crate) struct RemoteMirror {
    value: Value,
}

impl RemoteMirror {
    pub(crate) fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn put(&mut self, path: &str, data: Value) {
        let segments = split_path(path);
        set_at(&mut self.value, &segments, data);
    }

    pub(crate) fn patch(&mut self, path: &str, data: Value) {
        let children = match data {
            Value::Object(children) => children,
            other => return self.put(path, other),
        };
        let base = split_path(path);
        for (key, child) in children {
            let mut segments = base.clone();
            segments.push(key.as_str());
            set_at(&mut self.value, &segments, child);
        }
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn set_at(node: &mut Value, segments: &[&str], data: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = data;
        return;
    };
    if !node.is_object() {
        if data.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };
    if rest.is_empty() && data.is_null() {
        map.remove(*head);
        return;
    }
    let child = map.entry((*head).to_string()).or_insert(Value::Null);
    set_at(child, rest, data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_events_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"event: put\r\ndata: {\"path\":").is_empty());
        let events = decoder.push(b"\"/\",\"data\":null}\r\n\r\nevent: keep-alive\ndata: null\n\n");
        assert_eq!(
            events,
            vec![
                SseEvent {
                    event: "put".into(),
                    data: "{\"path\":\"/\",\"data\":null}".into(),
                },
                SseEvent {
                    event: "keep-alive".into(),
                    data: "null".into(),
                },
            ]
        );
    }

    #[test]
    fn keeps_multibyte_text_split_mid_character() {
        let payload = "event: put\ndata: \"مشغول\"\n\n".as_bytes();
        let (first, second) = payload.split_at(19);
        let mut decoder = SseDecoder::default();
        let mut events = decoder.push(first);
        events.extend(decoder.push(second));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "\"مشغول\"");
    }

    #[test]
    fn mirror_applies_root_put_child_put_and_patch() {
        let mut mirror = RemoteMirror::default();
        mirror.put("/", json!({"status": "BUSY", "message": "a", "timestamp": 1}));
        mirror.put("/message", json!("b"));
        mirror.patch("/", json!({"status": "PRAYER", "timestamp": 2}));
        assert_eq!(
            mirror.value(),
            &json!({"status": "PRAYER", "message": "b", "timestamp": 2})
        );

        mirror.put("/message", Value::Null);
        assert_eq!(mirror.value(), &json!({"status": "PRAYER", "timestamp": 2}));

        mirror.put("/", Value::Null);
        assert!(mirror.value().is_null());
    }
}
