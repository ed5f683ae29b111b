pub mod error;
pub mod protocol;
pub mod result;
pub mod server;
pub mod worker;

use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use self::{error::NetworkingError, result::NetworkingResult};

/// Upper bound on a single frame; anything larger is treated as corruption.
pub const MAX_FRAME_LENGTH: u32 = 1 << 30;

/// One frame as it travels on the socket:
/// `[total length u32 BE][json length u32 BE][json][data]`,
/// where total length counts the json and data bytes.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub message_length: u32,
    pub json_length: u32,
    pub json_message: String,
    pub data: Vec<u8>,
}

pub async fn send_message<W>(
    stream: &mut W,
    json_message: &[u8],
    data: Option<&[u8]>,
) -> NetworkingResult<()>
where
    W: AsyncWrite + Unpin,
{
    let json_message_size = frame_length(json_message.len())?;
    let data_size = match data {
        Some(data) => frame_length(data.len())?,
        None => 0,
    };
    let total_message_size = json_message_size
        .checked_add(data_size)
        .filter(|size| *size <= MAX_FRAME_LENGTH)
        .ok_or_else(|| NetworkingError::MalformedFrame("frame too large".to_string()))?;

    let mut buffer = Vec::with_capacity(8 + total_message_size as usize);
    buffer.extend_from_slice(&total_message_size.to_be_bytes());
    buffer.extend_from_slice(&json_message_size.to_be_bytes());
    buffer.extend_from_slice(json_message);
    if let Some(data) = data {
        buffer.extend_from_slice(data);
    };

    trace!("Sending frame of {} bytes", buffer.len());
    stream.write_all(&buffer).await?;
    Ok(stream.flush().await?)
}

fn frame_length(length: usize) -> NetworkingResult<u32> {
    u32::try_from(length)
        .map_err(|_| NetworkingError::MalformedFrame(format!("{} bytes do not fit a frame", length)))
}

pub async fn read_message_length<R>(stream: &mut R) -> NetworkingResult<u32>
where
    R: AsyncRead + Unpin,
{
    let mut length_bytes = [0u8; 4];
    stream.read_exact(&mut length_bytes).await?;
    Ok(u32::from_be_bytes(length_bytes))
}

pub async fn read_json_message<R>(stream: &mut R, length: usize) -> NetworkingResult<String>
where
    R: AsyncRead + Unpin,
{
    let mut json_message = vec![0u8; length];
    stream.read_exact(&mut json_message).await?;
    String::from_utf8(json_message)
        .map_err(|e| NetworkingError::MalformedFrame(format!("header is not UTF-8: {}", e)))
}

pub async fn read_binary_data<R>(stream: &mut R, length: usize) -> NetworkingResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut data_message = vec![0u8; length];
    stream.read_exact(&mut data_message).await?;
    Ok(data_message)
}

pub async fn read_message_raw<R>(stream: &mut R) -> NetworkingResult<RawMessage>
where
    R: AsyncRead + Unpin,
{
    let message_length = read_message_length(stream).await?;
    let json_length = read_message_length(stream).await?;
    if message_length > MAX_FRAME_LENGTH || json_length > message_length {
        return Err(NetworkingError::MalformedFrame(format!(
            "json length {} with total length {}",
            json_length, message_length
        )));
    }

    let json_message = read_json_message(stream, json_length as usize).await?;
    let data = read_binary_data(stream, (message_length - json_length) as usize).await?;
    trace!("Received frame: {}", json_message);

    Ok(RawMessage {
        message_length,
        json_length,
        json_message,
        data,
    })
}
