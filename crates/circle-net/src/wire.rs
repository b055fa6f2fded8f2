//! Wire framing for [`crate::TcpSubstrate`].
//!
//! Every frame is `[u32 LE length][tag byte][payload]`. `WorkReply`'s payload
//! is itself a length-prefixed sequence of length-prefixed byte strings, per
//! §6 of the design.

use crate::error::SubstrateError;
use crate::message::{Colour, Message};

const TAG_REQUEST_WORK: u8 = 0;
const TAG_WORK_REPLY: u8 = 1;
const TAG_NO_WORK: u8 = 2;
const TAG_TOKEN: u8 = 3;
const TAG_ABORT: u8 = 4;
const TAG_DONE: u8 = 5;
const TAG_REDUCE: u8 = 6;

/// An internal control frame used for connection-local rendezvous (barrier).
/// Never surfaced to callers of [`crate::Substrate`] as a [`Message`].
pub(crate) enum Frame {
    App(Message),
    BarrierJoin,
    BarrierRelease,
}

const FRAME_APP: u8 = 0x10;
const FRAME_BARRIER_JOIN: u8 = 0x11;
const FRAME_BARRIER_RELEASE: u8 = 0x12;

pub(crate) fn encode_frame(frame: &Frame) -> Vec<u8> {
    match frame {
        Frame::App(msg) => {
            let mut body = vec![FRAME_APP];
            body.extend(encode_message(msg));
            with_len_prefix(body)
        }
        Frame::BarrierJoin => with_len_prefix(vec![FRAME_BARRIER_JOIN]),
        Frame::BarrierRelease => with_len_prefix(vec![FRAME_BARRIER_RELEASE]),
    }
}

pub(crate) fn decode_frame(body: &[u8], from: usize) -> Result<Frame, SubstrateError> {
    let (&kind, rest) = body
        .split_first()
        .ok_or_else(|| malformed(from, "empty frame"))?;
    match kind {
        FRAME_APP => Ok(Frame::App(decode_message(rest, from)?)),
        FRAME_BARRIER_JOIN => Ok(Frame::BarrierJoin),
        FRAME_BARRIER_RELEASE => Ok(Frame::BarrierRelease),
        other => Err(malformed(from, &format!("unknown frame kind {other}"))),
    }
}

fn with_len_prefix(body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend((body.len() as u32).to_le_bytes());
    out.extend(body);
    out
}

fn encode_message(msg: &Message) -> Vec<u8> {
    match msg {
        Message::RequestWork => vec![TAG_REQUEST_WORK],
        Message::NoWork => vec![TAG_NO_WORK],
        Message::Abort => vec![TAG_ABORT],
        Message::Done => vec![TAG_DONE],
        Message::Token { colour } => {
            let c = match colour {
                Colour::White => 0u8,
                Colour::Black => 1u8,
            };
            vec![TAG_TOKEN, c]
        }
        Message::Reduce { processed } => {
            let mut out = vec![TAG_REDUCE];
            out.extend(processed.to_le_bytes());
            out
        }
        Message::WorkReply { items } => {
            let mut out = vec![TAG_WORK_REPLY];
            out.extend((items.len() as u32).to_le_bytes());
            for item in items {
                out.extend((item.len() as u32).to_le_bytes());
                out.extend(item);
            }
            out
        }
    }
}

fn decode_message(body: &[u8], from: usize) -> Result<Message, SubstrateError> {
    let (&tag, rest) = body
        .split_first()
        .ok_or_else(|| malformed(from, "empty message body"))?;
    match tag {
        TAG_REQUEST_WORK => Ok(Message::RequestWork),
        TAG_NO_WORK => Ok(Message::NoWork),
        TAG_ABORT => Ok(Message::Abort),
        TAG_DONE => Ok(Message::Done),
        TAG_TOKEN => {
            let &c = rest.first().ok_or_else(|| malformed(from, "truncated token"))?;
            let colour = match c {
                0 => Colour::White,
                1 => Colour::Black,
                other => return Err(malformed(from, &format!("unknown token colour {other}"))),
            };
            Ok(Message::Token { colour })
        }
        TAG_REDUCE => {
            let bytes: [u8; 8] = rest
                .get(0..8)
                .ok_or_else(|| malformed(from, "truncated reduce count"))?
                .try_into()
                .unwrap();
            Ok(Message::Reduce {
                processed: u64::from_le_bytes(bytes),
            })
        }
        TAG_WORK_REPLY => {
            let mut cursor = 0usize;
            let count = read_u32(rest, &mut cursor, from)?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let len = read_u32(rest, &mut cursor, from)? as usize;
                let item = rest
                    .get(cursor..cursor + len)
                    .ok_or_else(|| malformed(from, "truncated work reply item"))?
                    .to_vec();
                cursor += len;
                items.push(item);
            }
            Ok(Message::WorkReply { items })
        }
        other => Err(malformed(from, &format!("unknown message tag {other}"))),
    }
}

fn read_u32(buf: &[u8], cursor: &mut usize, from: usize) -> Result<u32, SubstrateError> {
    let bytes: [u8; 4] = buf
        .get(*cursor..*cursor + 4)
        .ok_or_else(|| malformed(from, "truncated length prefix"))?
        .try_into()
        .unwrap();
    *cursor += 4;
    Ok(u32::from_le_bytes(bytes))
}

fn malformed(rank: usize, reason: &str) -> SubstrateError {
    SubstrateError::MalformedMessage {
        rank,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_tag() {
        let messages = vec![
            Message::RequestWork,
            Message::NoWork,
            Message::Abort,
            Message::Done,
            Message::Token { colour: Colour::Black },
            Message::Reduce { processed: 42 },
            Message::WorkReply {
                items: vec![b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()],
            },
        ];
        for msg in messages {
            let encoded = encode_message(&msg);
            let decoded = decode_message(&encoded, 0).unwrap();
            assert_eq!(format!("{msg:?}"), format!("{decoded:?}"));
        }
    }

    #[test]
    fn truncated_work_reply_is_malformed() {
        let err = decode_message(&[TAG_WORK_REPLY, 1, 0, 0, 0], 3).unwrap_err();
        assert!(matches!(err, SubstrateError::MalformedMessage { rank: 3, .. }));
    }
}
