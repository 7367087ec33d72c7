use futures::{Stream, Sink};
use tokio::net::TcpStream;
use tokio_serial::{SerialStream, SerialPortBuilderExt};
use tokio_util::codec::Framed;
use url::Url;
use anyhow::{Result, Context, bail};

use crate::protocol::codec::{RxFrame, TxFrame, KelvinatorFrameCodec};


pub const DEFAULT_BAUD_RATE: u32 = 9600;

pub enum Port {
    Serial(SerialStream),
    TcpRaw(TcpStream)
}


pub trait PortStream: Stream<Item = std::io::Result<RxFrame>> + Sink<TxFrame, Error = std::io::Error> + Send + Unpin {}

impl<T> PortStream for T
where
    T: Stream<Item = std::io::Result<RxFrame>> + Sink<TxFrame, Error = std::io::Error> + Send + Unpin,
{}


/// Baud rate from a `?baud=` query parameter, if any.
fn baud_rate(url: &Url) -> Result<u32> {
    match url.query_pairs().find(|(key, _)| key == "baud") {
        Some((_, value)) => value.parse()
            .with_context(|| format!("invalid baud rate {value} in url: {url}")),
        None => Ok(DEFAULT_BAUD_RATE)
    }
}

impl Port {
    pub async fn open(url: &Url) -> Result<Self> {
        match url.scheme() {
            "serial" => {
                let path = url.path();
                let baud = baud_rate(url)?;

                let port = tokio_serial::new(path, baud)
                    .data_bits(tokio_serial::DataBits::Eight)
                    .stop_bits(tokio_serial::StopBits::One)
                    .parity(tokio_serial::Parity::None)
                    .open_native_async()
                    .with_context(|| format!("failed to open serial port {path}"))
                    ?;

                Ok(Self::Serial(port))
            },
            "tcp+raw" => {
                let host = url.host_str()
                    .with_context(|| format!("tcp+raw requires a host to be specified in the url: {url}"))?;

                let port = url.port()
                    .with_context(|| format!("tcp+raw requires a port number to be specified in the url: {url}"))?;

                let stream = TcpStream::connect((host, port)).await
                    .with_context(|| format!("failed to open tcp+raw connection to: {url}"))?;

                stream.set_nodelay(true)?;

                Ok(Self::TcpRaw(stream))
            },
            other => {
                bail!("url scheme {other} not supported");
            }
        }
    }

    pub fn framed(self) -> Box<dyn PortStream> {
        match self {
            Port::Serial(port) => {
                Box::new(Framed::new(port, KelvinatorFrameCodec::new()))
            },
            Port::TcpRaw(stream) => {
                Box::new(Framed::new(stream, KelvinatorFrameCodec::new()))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use futures::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio::io::AsyncWriteExt;

    use crate::climate::{ClimateMode, ClimateState};
    use crate::protocol::kelvinator::{ClimateIrCodec, Kelvinator};

    use super::*;

    #[test]
    fn test_baud_rate() {
        let url = Url::parse("serial:///dev/ttyUSB0").unwrap();
        assert_eq!(baud_rate(&url).unwrap(), DEFAULT_BAUD_RATE);

        let url = Url::parse("serial:///dev/ttyUSB0?baud=115200").unwrap();
        assert_eq!(baud_rate(&url).unwrap(), 115200);

        let url = Url::parse("serial:///dev/ttyUSB0?baud=fast").unwrap();
        assert!(baud_rate(&url).is_err());
    }

    #[tokio::test]
    async fn test_open_unsupported_scheme() {
        let url = Url::parse("http://localhost:1234").unwrap();
        assert!(Port::open(&url).await.is_err());

        let url = Url::parse("tcp+raw://localhost").unwrap();
        assert!(Port::open(&url).await.is_err());
    }

    #[tokio::test]
    async fn test_tcp_raw_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let data = Kelvinator::new().encode(&ClimateState {
            mode: ClimateMode::Heat,
            target_temperature: 23.0,
            ..Default::default()
        });

        let server = tokio::spawn({
            let bytes = data.bytes();
            async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                socket.write_all(&bytes).await.unwrap();

                let mut received = vec![0u8; bytes.len()];
                tokio::io::AsyncReadExt::read_exact(&mut socket, &mut received).await.unwrap();
                received
            }
        });

        let url = Url::parse(&format!("tcp+raw://{addr}")).unwrap();
        let mut framed = Port::open(&url).await.unwrap().framed();

        let frame = framed.next().await.unwrap().unwrap();
        assert_eq!(frame.data(), Some(&data));

        framed.send(data.clone()).await.unwrap();
        assert_eq!(server.await.unwrap(), data.bytes());
    }
}
