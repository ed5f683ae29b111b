use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    config::RenderConfig,
    models::fragments::{
        assignment::Assignment, completion::Completion, messages::CoordinatorMessage,
    },
};

use super::{
    error::NetworkingError, read_message_raw, result::NetworkingResult, send_message, RawMessage,
};

const ROW_INDEX_SIZE: usize = std::mem::size_of::<u32>();
const COLOR_SIZE: usize = std::mem::size_of::<i64>();

/// Handshake a worker sends right after connecting. It carries every derived
/// value that affects pixel colors, so mismatches surface before any rows are
/// computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub block_size: u32,
    pub iterations: u32,
    pub min_re: f64,
    pub max_re: f64,
    pub min_im: f64,
    pub max_im: f64,
    pub color_min: u32,
    pub color_max: u32,
}

impl Registration {
    pub fn new(name: String, config: &RenderConfig) -> Self {
        Self {
            name,
            width: config.width,
            height: config.height,
            block_size: config.block_size,
            iterations: config.iterations,
            min_re: config.min_re,
            max_re: config.max_re,
            min_im: config.min_im,
            max_im: config.max_im,
            color_min: config.color_min,
            color_max: config.color_max,
        }
    }

    pub fn check(&self, config: &RenderConfig) -> NetworkingResult<()> {
        let expected = Registration::new(self.name.clone(), config);
        let mut differences = Vec::new();
        let mut compare = |field: &str, got: String, want: String| {
            if got != want {
                differences.push(format!("{} {} (coordinator: {})", field, got, want));
            }
        };
        compare("width", self.width.to_string(), expected.width.to_string());
        compare("height", self.height.to_string(), expected.height.to_string());
        compare(
            "block size",
            self.block_size.to_string(),
            expected.block_size.to_string(),
        );
        compare(
            "iterations",
            self.iterations.to_string(),
            expected.iterations.to_string(),
        );
        compare("min re", self.min_re.to_string(), expected.min_re.to_string());
        compare("max re", self.max_re.to_string(), expected.max_re.to_string());
        compare("min im", self.min_im.to_string(), expected.min_im.to_string());
        compare("max im", self.max_im.to_string(), expected.max_im.to_string());
        compare(
            "color min",
            format!("0x{:06x}", self.color_min),
            format!("0x{:06x}", expected.color_min),
        );
        compare(
            "color max",
            format!("0x{:06x}", self.color_max),
            format!("0x{:06x}", expected.color_max),
        );

        if differences.is_empty() {
            return Ok(());
        }
        Err(NetworkingError::ConfigMismatch {
            name: self.name.clone(),
            detail: differences.join(", "),
        })
    }
}

/// JSON part of a frame. Bulk integers travel in the binary part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageHeader {
    Register(Registration),
    Assignment { rows: u32 },
    Completion { rows: u32, width: u32 },
    Termination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Register(Registration),
    Assignment(Assignment),
    Completion(Completion),
    Termination,
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Register(_) => "Register",
            Message::Assignment(_) => "Assignment",
            Message::Completion(_) => "Completion",
            Message::Termination => "Termination",
        }
    }
}

impl From<CoordinatorMessage> for Message {
    fn from(message: CoordinatorMessage) -> Self {
        match message {
            CoordinatorMessage::Assign(assignment) => Message::Assignment(assignment),
            CoordinatorMessage::Terminate => Message::Termination,
        }
    }
}

pub fn encode(message: &Message) -> NetworkingResult<(String, Vec<u8>)> {
    let (header, data) = match message {
        Message::Register(registration) => (MessageHeader::Register(registration.clone()), vec![]),
        Message::Assignment(assignment) => {
            let mut data = Vec::with_capacity(assignment.len() * ROW_INDEX_SIZE);
            for row in &assignment.rows {
                data.extend_from_slice(&row.to_be_bytes());
            }
            let rows = count(assignment.len())?;
            (MessageHeader::Assignment { rows }, data)
        }
        Message::Completion(completion) => {
            let width = completion.rows.first().map_or(0, |row| row.colors.len());
            let mut data = Vec::with_capacity(completion.row_count() * (width + 1) * COLOR_SIZE);
            for row in &completion.rows {
                if row.colors.len() != width {
                    return Err(NetworkingError::Protocol(format!(
                        "row {} has {} colors, expected {}",
                        row.row,
                        row.colors.len(),
                        width
                    )));
                }
                data.extend_from_slice(&(row.row as i64).to_be_bytes());
                for color in &row.colors {
                    data.extend_from_slice(&color.to_be_bytes());
                }
            }
            let header = MessageHeader::Completion {
                rows: count(completion.row_count())?,
                width: count(width)?,
            };
            (header, data)
        }
        Message::Termination => (MessageHeader::Termination, vec![]),
    };
    Ok((serde_json::to_string(&header)?, data))
}

pub fn decode(raw: RawMessage) -> NetworkingResult<Message> {
    let header: MessageHeader = serde_json::from_str(&raw.json_message)?;
    match header {
        MessageHeader::Register(registration) => {
            expect_len(&raw.data, 0)?;
            Ok(Message::Register(registration))
        }
        MessageHeader::Assignment { rows } => {
            expect_len(&raw.data, rows as usize * ROW_INDEX_SIZE)?;
            let rows = raw
                .data
                .chunks_exact(ROW_INDEX_SIZE)
                .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            Ok(Message::Assignment(Assignment::new(rows)))
        }
        MessageHeader::Completion { rows, width } => {
            let stride = (width as usize + 1) * COLOR_SIZE;
            expect_len(&raw.data, rows as usize * stride)?;

            let mut completion = Completion::with_capacity(rows as usize);
            for chunk in raw.data.chunks_exact(stride) {
                let mut values = chunk.chunks_exact(COLOR_SIZE).map(read_i64);
                let row = values.next().unwrap_or_default();
                let row = u32::try_from(row).map_err(|_| {
                    NetworkingError::MalformedFrame(format!("invalid row index {}", row))
                })?;
                completion.push(row, values.collect());
            }
            Ok(Message::Completion(completion))
        }
        MessageHeader::Termination => {
            expect_len(&raw.data, 0)?;
            Ok(Message::Termination)
        }
    }
}

pub async fn send<W>(stream: &mut W, message: &Message) -> NetworkingResult<()>
where
    W: AsyncWrite + Unpin,
{
    let (json, data) = encode(message)?;
    let data = (!data.is_empty()).then_some(data.as_slice());
    send_message(stream, json.as_bytes(), data).await
}

pub async fn receive<R>(stream: &mut R) -> NetworkingResult<Message>
where
    R: AsyncRead + Unpin,
{
    decode(read_message_raw(stream).await?)
}

fn read_i64(chunk: &[u8]) -> i64 {
    let mut bytes = [0u8; COLOR_SIZE];
    bytes.copy_from_slice(chunk);
    i64::from_be_bytes(bytes)
}

fn count(value: usize) -> NetworkingResult<u32> {
    u32::try_from(value)
        .map_err(|_| NetworkingError::MalformedFrame(format!("count {} is too large", value)))
}

fn expect_len(data: &[u8], expected: usize) -> NetworkingResult<()> {
    if data.len() != expected {
        return Err(NetworkingError::MalformedFrame(format!(
            "expected {} data bytes, got {}",
            expected,
            data.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderOptions;

    fn config() -> RenderConfig {
        RenderConfig::new(
            RenderOptions {
                width: 3,
                height: 4,
                block_size: 2,
                ..RenderOptions::default()
            },
            2,
        )
        .unwrap()
    }

    #[test]
    fn termination_has_empty_payload() {
        let (json, data) = encode(&Message::Termination).unwrap();
        assert_eq!(json, r#""Termination""#);
        assert!(data.is_empty());
    }

    #[test]
    fn completion_payload_is_row_then_colors() {
        let mut completion = Completion::default();
        completion.push(2, vec![10, -1, 0x1_000_000]);
        completion.push(3, vec![0, 1, 2]);

        let (json, data) = encode(&Message::Completion(completion)).unwrap();
        assert_eq!(json, r#"{"Completion":{"rows":2,"width":3}}"#);
        // blockSize * (width + 1) integers
        assert_eq!(data.len(), 2 * 4 * 8);
        assert_eq!(&data[0..8], &2i64.to_be_bytes());
        assert_eq!(&data[16..24], &(-1i64).to_be_bytes());
        assert_eq!(&data[32..40], &3i64.to_be_bytes());
    }

    #[test]
    fn ragged_completion_cannot_be_encoded() {
        let mut completion = Completion::default();
        completion.push(0, vec![1, 2]);
        completion.push(1, vec![1]);
        let err = encode(&Message::Completion(completion)).unwrap_err();
        assert!(matches!(err, NetworkingError::Protocol(_)));
    }

    #[tokio::test]
    async fn messages_survive_a_socket_pair() {
        let (mut left, mut right) = tokio::io::duplex(1024);
        let mut completion = Completion::default();
        completion.push(7, vec![5, 6, 7]);

        let sent = vec![
            Message::Register(Registration::new("w".to_string(), &config())),
            Message::Assignment(Assignment::new(vec![4, 5])),
            Message::Completion(completion),
            Message::Termination,
        ];
        for message in &sent {
            send(&mut left, message).await.unwrap();
        }
        for message in &sent {
            assert_eq!(&receive(&mut right).await.unwrap(), message);
        }
    }

    #[test]
    fn short_payload_is_malformed() {
        let raw = RawMessage {
            message_length: 0,
            json_length: 0,
            json_message: r#"{"Assignment":{"rows":2}}"#.to_string(),
            data: vec![0, 0, 0, 1],
        };
        assert!(matches!(
            decode(raw).unwrap_err(),
            NetworkingError::MalformedFrame(_)
        ));
    }

    #[test]
    fn negative_row_index_is_malformed() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-3i64).to_be_bytes());
        data.extend_from_slice(&0i64.to_be_bytes());
        let raw = RawMessage {
            message_length: 0,
            json_length: 0,
            json_message: r#"{"Completion":{"rows":1,"width":1}}"#.to_string(),
            data,
        };
        assert!(matches!(
            decode(raw).unwrap_err(),
            NetworkingError::MalformedFrame(_)
        ));
    }

    #[test]
    fn registration_detects_mismatched_config() {
        let ours = config();
        let registration = Registration::new("w".to_string(), &ours);
        assert!(registration.check(&ours).is_ok());

        let theirs = RenderConfig {
            iterations: 10,
            ..ours.clone()
        };
        let err = Registration::new("w".to_string(), &theirs)
            .check(&ours)
            .unwrap_err();
        assert!(matches!(err, NetworkingError::ConfigMismatch { .. }));
    }

    #[test]
    fn registration_detects_shifted_view_and_colors() {
        let ours = config();
        let shifted = RenderConfig::new(
            RenderOptions {
                width: 3,
                height: 4,
                block_size: 2,
                x_offset: 1.0,
                color_min: 0x00ff00,
                ..RenderOptions::default()
            },
            2,
        )
        .unwrap();

        match Registration::new("w".to_string(), &shifted).check(&ours) {
            Err(NetworkingError::ConfigMismatch { detail, .. }) => {
                assert!(detail.contains("min re"), "{}", detail);
                assert!(detail.contains("max re"), "{}", detail);
                assert!(detail.contains("color min 0x00ff00"), "{}", detail);
                assert!(!detail.contains("width"), "{}", detail);
            }
            other => panic!("expected a mismatch, got {:?}", other),
        }
    }

    #[test]
    fn registration_bounds_survive_json_exactly() {
        let config = RenderConfig::new(
            RenderOptions {
                width: 3,
                height: 4,
                block_size: 2,
                x_offset: -0.743643887037151,
                y_offset: 0.13182590420533,
                axis_length: 0.1 + 0.2,
                ..RenderOptions::default()
            },
            2,
        )
        .unwrap();
        let (json, _) = encode(&Message::Register(Registration::new("w".to_string(), &config)))
            .unwrap();
        let raw = RawMessage {
            message_length: 0,
            json_length: 0,
            json_message: json,
            data: vec![],
        };
        match decode(raw).unwrap() {
            Message::Register(registration) => registration.check(&config).unwrap(),
            other => panic!("unexpected {:?}", other),
        }
    }
}
