//! Message encoding/decoding.
//!
//! The element tag selects the kind (`<osc>`, `<midi>`, `<local>`). Every
//! kind starts with `enabled`; OSC and MIDI follow it with the
//! send/receive/feedback/connections flags. All kinds carry a `<triggers>`
//! list, then their kind-specific payload.

use log::trace;

use crate::codec::primitives::{flag, invalid, push_field, Fields};
use crate::codec::xml::XmlElement;
use crate::error::DecodeError;
use crate::model::{
    Connections, ControlId, Conversion, LocalDestination, LocalMessage, LocalSource, Message,
    MessageKind, MidiDescriptor, MidiMessage, MidiMessageType, MidiValue, OscMessage, Partial,
    PartialType, Trigger, TriggerCondition, ValueKey,
};

/// Encodes a message; the element tag is the message kind.
pub fn encode_message(message: &Message) -> XmlElement {
    match message {
        Message::Osc(m) => encode_osc(m),
        Message::Midi(m) => encode_midi(m),
        Message::Local(m) => encode_local(m),
    }
}

/// Decodes a message, dispatching on the element tag.
pub fn decode_message(element: &XmlElement) -> Result<Message, DecodeError> {
    let kind = MessageKind::from_tag(&element.name).ok_or_else(|| {
        DecodeError::UnknownMessageKind {
            tag: element.name.clone(),
        }
    })?;
    trace!("decoding <{kind}> message");
    Ok(match kind {
        MessageKind::Osc => Message::Osc(decode_osc(element)?),
        MessageKind::Midi => Message::Midi(decode_midi(element)?),
        MessageKind::Local => Message::Local(decode_local(element)?),
    })
}

// =============================================================================
// Shared parts
// =============================================================================

struct Routing {
    enabled: bool,
    send: bool,
    receive: bool,
    feedback: bool,
    connections: Connections,
}

fn encode_routing(element: &mut XmlElement, routing: Routing) {
    push_field(element, "enabled", flag(routing.enabled));
    push_field(element, "send", flag(routing.send));
    push_field(element, "receive", flag(routing.receive));
    push_field(element, "feedback", flag(routing.feedback));
    push_field(element, "connections", routing.connections.to_string());
}

fn decode_routing(fields: &Fields<'_>) -> Result<Routing, DecodeError> {
    Ok(Routing {
        enabled: fields.flag("enabled")?,
        send: fields.flag("send")?,
        receive: fields.flag("receive")?,
        feedback: fields.flag("feedback")?,
        connections: fields.parse("connections", Connections::parse)?,
    })
}

fn encode_triggers(element: &mut XmlElement, triggers: &[Trigger]) {
    let mut list = XmlElement::new("triggers");
    for trigger in triggers {
        let mut item = XmlElement::new("trigger");
        push_field(&mut item, "var", trigger.var.name());
        push_field(&mut item, "condition", trigger.condition.name());
        list.push(item);
    }
    element.push(list);
}

fn decode_triggers(fields: &Fields<'_>) -> Result<Vec<Trigger>, DecodeError> {
    fields
        .list("triggers")
        .iter()
        .map(|item| {
            let f = Fields::new(item, "trigger");
            Ok(Trigger {
                var: f.parse("var", ValueKey::from_name)?,
                condition: f.parse("condition", TriggerCondition::from_name)?,
            })
        })
        .collect()
}

fn encode_partials(element: &mut XmlElement, name: &str, partials: &[Partial]) {
    let mut list = XmlElement::new(name);
    for partial in partials {
        let mut item = XmlElement::new("partial");
        push_field(&mut item, "type", partial.kind.name());
        push_field(&mut item, "conversion", partial.conversion.name());
        push_field(&mut item, "value", partial.value.as_str());
        push_field(&mut item, "scaleMin", partial.scale_min.to_string());
        push_field(&mut item, "scaleMax", partial.scale_max.to_string());
        list.push(item);
    }
    element.push(list);
}

fn decode_partials(fields: &Fields<'_>, name: &'static str) -> Result<Vec<Partial>, DecodeError> {
    fields
        .list(name)
        .iter()
        .map(|item| {
            let f = Fields::new(item, "partial");
            Ok(Partial {
                kind: f.parse("type", PartialType::from_name)?,
                conversion: f.parse("conversion", Conversion::from_name)?,
                value: f.text("value")?.to_string(),
                scale_min: f.f64("scaleMin")?,
                scale_max: f.f64("scaleMax")?,
            })
        })
        .collect()
}

// =============================================================================
// OSC
// =============================================================================

fn encode_osc(m: &OscMessage) -> XmlElement {
    let mut element = XmlElement::new(MessageKind::Osc.tag());
    encode_routing(
        &mut element,
        Routing {
            enabled: m.enabled,
            send: m.send,
            receive: m.receive,
            feedback: m.feedback,
            connections: m.connections,
        },
    );
    encode_triggers(&mut element, &m.triggers);
    encode_partials(&mut element, "path", &m.path);
    encode_partials(&mut element, "arguments", &m.arguments);
    element
}

fn decode_osc(element: &XmlElement) -> Result<OscMessage, DecodeError> {
    let fields = Fields::new(element, "osc");
    let routing = decode_routing(&fields)?;
    Ok(OscMessage {
        enabled: routing.enabled,
        send: routing.send,
        receive: routing.receive,
        feedback: routing.feedback,
        connections: routing.connections,
        triggers: decode_triggers(&fields)?,
        path: decode_partials(&fields, "path")?,
        arguments: decode_partials(&fields, "arguments")?,
    })
}

// =============================================================================
// MIDI
// =============================================================================

fn encode_midi(m: &MidiMessage) -> XmlElement {
    let mut element = XmlElement::new(MessageKind::Midi.tag());
    encode_routing(
        &mut element,
        Routing {
            enabled: m.enabled,
            send: m.send,
            receive: m.receive,
            feedback: m.feedback,
            connections: m.connections,
        },
    );
    encode_triggers(&mut element, &m.triggers);

    let mut descriptor = XmlElement::new("message");
    push_field(&mut descriptor, "type", m.message.kind.name());
    push_field(&mut descriptor, "channel", m.message.channel.to_string());
    push_field(&mut descriptor, "data1", m.message.data1.to_string());
    push_field(&mut descriptor, "data2", m.message.data2.to_string());
    element.push(descriptor);

    let mut values = XmlElement::new("values");
    for value in &m.values {
        let mut item = XmlElement::new("value");
        push_field(&mut item, "type", value.kind.name());
        push_field(&mut item, "key", value.key.as_str());
        push_field(&mut item, "scaleMin", value.scale_min.to_string());
        push_field(&mut item, "scaleMax", value.scale_max.to_string());
        values.push(item);
    }
    element.push(values);
    element
}

fn decode_midi(element: &XmlElement) -> Result<MidiMessage, DecodeError> {
    let fields = Fields::new(element, "midi");
    let routing = decode_routing(&fields)?;

    let d = Fields::new(fields.child("message")?, "message");
    let message = MidiDescriptor {
        kind: d.parse("type", MidiMessageType::from_name)?,
        channel: d.u8("channel")?,
        data1: d.u8("data1")?,
        data2: d.u8("data2")?,
    };

    // Older writers tag the entries `<midivalue>`.
    let values = fields
        .list("values")
        .iter()
        .map(|item| {
            if item.name != "value" && item.name != "midivalue" {
                return Err(DecodeError::UnexpectedElement {
                    parent: "values",
                    found: item.name.clone(),
                });
            }
            let f = Fields::new(item, "value");
            Ok(MidiValue {
                kind: f.parse("type", PartialType::from_name)?,
                key: f.text("key")?.to_string(),
                scale_min: f.f64("scaleMin")?,
                scale_max: f.f64("scaleMax")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MidiMessage {
        enabled: routing.enabled,
        send: routing.send,
        receive: routing.receive,
        feedback: routing.feedback,
        connections: routing.connections,
        triggers: decode_triggers(&fields)?,
        message,
        values,
    })
}

// =============================================================================
// Local
// =============================================================================

fn encode_local(m: &LocalMessage) -> XmlElement {
    let mut element = XmlElement::new(MessageKind::Local.tag());
    push_field(&mut element, "enabled", flag(m.enabled));
    encode_triggers(&mut element, &m.triggers);
    push_field(&mut element, "type", m.source.kind.name());
    push_field(&mut element, "conversion", m.source.conversion.name());
    push_field(&mut element, "value", m.source.key.as_str());
    push_field(&mut element, "scaleMin", m.source.scale_min.to_string());
    push_field(&mut element, "scaleMax", m.source.scale_max.to_string());
    push_field(&mut element, "dstType", m.destination.kind.name());
    push_field(&mut element, "dstVar", m.destination.key.as_str());
    push_field(
        &mut element,
        "dstID",
        m.destination.target.map(|id| id.to_string()).unwrap_or_default(),
    );
    element
}

fn decode_local(element: &XmlElement) -> Result<LocalMessage, DecodeError> {
    let f = Fields::new(element, "local");

    let dst_type = f.text("dstType")?;
    // An unlinked destination may be written with an empty type.
    let dst_kind = match dst_type.trim() {
        "" => PartialType::Value,
        name => PartialType::from_name(name).ok_or_else(|| invalid("dstType", dst_type))?,
    };

    let dst_id = f.text("dstID")?;
    let target = match dst_id.trim() {
        "" => None,
        text => Some(ControlId::parse(text).ok_or_else(|| DecodeError::InvalidId {
            found: dst_id.to_string(),
        })?),
    };

    Ok(LocalMessage {
        enabled: f.flag("enabled")?,
        triggers: decode_triggers(&f)?,
        source: LocalSource {
            kind: f.parse("type", PartialType::from_name)?,
            conversion: f.parse("conversion", Conversion::from_name)?,
            key: f.text("value")?.to_string(),
            scale_min: f.f64("scaleMin")?,
            scale_max: f.f64("scaleMax")?,
        },
        destination: LocalDestination {
            kind: dst_kind,
            key: f.text("dstVar")?.to_string(),
            target,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::xml;

    fn names(element: &XmlElement) -> Vec<&str> {
        element.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_osc_layout() {
        let element = encode_message(&OscMessage::default().into());
        assert_eq!(element.name, "osc");
        assert_eq!(
            names(&element),
            ["enabled", "send", "receive", "feedback", "connections", "triggers", "path", "arguments"]
        );
        assert_eq!(element.child_text("connections"), Some("00001"));
        let path = element.child("path").unwrap();
        assert_eq!(path.children.len(), 2);
        assert_eq!(
            names(&path.children[0]),
            ["type", "conversion", "value", "scaleMin", "scaleMax"]
        );
    }

    #[test]
    fn test_midi_layout() {
        let element = encode_message(&MidiMessage::default().into());
        assert_eq!(
            names(&element),
            ["enabled", "send", "receive", "feedback", "connections", "triggers", "message", "values"]
        );
        let message = element.child("message").unwrap();
        assert_eq!(message.child_text("type"), Some("CONTROLCHANGE"));
        assert_eq!(element.child("values").unwrap().children.len(), 3);
    }

    #[test]
    fn test_local_layout() {
        let element = encode_message(&LocalMessage::default().into());
        assert_eq!(
            names(&element),
            [
                "enabled", "triggers", "type", "conversion", "value", "scaleMin", "scaleMax",
                "dstType", "dstVar", "dstID"
            ]
        );
        assert_eq!(element.child("dstID").map(|e| e.text.as_str()), Some(""));
    }

    #[test]
    fn test_encode_decode_each_kind() {
        let target = ControlId::new();
        let mut osc = OscMessage::default();
        osc.connections = Connections::channels([1, 3]);
        osc.triggers.push(Trigger::new(ValueKey::Touch, TriggerCondition::Rise));
        osc.arguments.push(Partial::index());

        let mut midi = MidiMessage::default();
        midi.message.kind = MidiMessageType::NoteOn;
        midi.message.channel = 9;
        midi.message.data1 = 60;

        for message in [
            Message::from(osc),
            Message::from(midi),
            Message::from(LocalMessage::to(target, "touch")),
        ] {
            assert_eq!(decode_message(&encode_message(&message)).unwrap(), message);
        }
    }

    #[test]
    fn test_unknown_kind() {
        let element = XmlElement::new("gamepad");
        assert_eq!(
            decode_message(&element),
            Err(DecodeError::UnknownMessageKind { tag: "gamepad".into() })
        );
    }

    #[test]
    fn test_decode_rejects_bad_fields() {
        let mut element = encode_message(&OscMessage::default().into());
        element.children[4].text = "0201".into();
        assert!(matches!(
            decode_message(&element),
            Err(DecodeError::InvalidField { field: "connections", .. })
        ));

        let mut element = encode_message(&LocalMessage::default().into());
        element.children[9].text = "not-a-uuid".into();
        assert!(matches!(decode_message(&element), Err(DecodeError::InvalidId { .. })));
    }

    #[test]
    fn test_decode_legacy_midivalue_and_empty_dst_type() {
        let midi = xml::parse(
            b"<midi><enabled>1</enabled><send>1</send><receive>0</receive><feedback>0</feedback>\
              <connections>00001</connections><triggers/>\
              <message><type>NOTE_ON</type><channel>0</channel><data1>64</data1><data2>127</data2></message>\
              <values><midivalue><type>VALUE</type><key>x</key><scaleMin>0</scaleMin><scaleMax>127</scaleMax></midivalue></values>\
              </midi>",
            16,
        )
        .unwrap();
        let Message::Midi(m) = decode_message(&midi).unwrap() else {
            panic!("expected a MIDI message");
        };
        assert!(m.triggers.is_empty());
        assert!(!m.receive);
        assert_eq!(m.values[0].key, "x");

        let local = xml::parse(
            b"<local><enabled>1</enabled><triggers><trigger><var>x</var><condition>ANY</condition></trigger></triggers>\
              <type>VALUE</type><conversion>FLOAT</conversion><value>x</value><scaleMin>0</scaleMin>\
              <scaleMax>1</scaleMax><dstType></dstType><dstVar></dstVar><dstID></dstID></local>",
            16,
        )
        .unwrap();
        let Message::Local(m) = decode_message(&local).unwrap() else {
            panic!("expected a local message");
        };
        assert_eq!(m.destination.kind, PartialType::Value);
        assert_eq!(m.destination.target, None);
    }
}
