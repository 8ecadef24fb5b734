use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Splice a data channel onto the upstream TCP service. Channel
/// messages are written to the socket; socket reads are sent back as
/// channel messages. EOF or an error on either side tears the bridge
/// down.
pub(crate) async fn attach(data_channel: Arc<RTCDataChannel>, upstream_addr: SocketAddr) {
    let stream = match TcpStream::connect(upstream_addr).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("failed to connect to upstream {upstream_addr}: {e}");
            if let Err(close_err) = data_channel.close().await {
                warn!("failed to close data channel: {close_err}");
            }
            return;
        }
    };
    debug!("connected to upstream {upstream_addr}");

    let (mut reader, writer) = stream.into_split();
    let writer = Arc::new(Mutex::new(writer));

    // Channel -> upstream.
    let write_half = writer.clone();
    data_channel.on_message(Box::new(move |msg: DataChannelMessage| {
        let writer = write_half.clone();
        Box::pin(async move {
            let mut writer = writer.lock().await;
            if let Err(e) = writer.write_all(&msg.data).await {
                warn!("failed to write to upstream: {e}");
            }
        })
    }));

    // Channel close tears the upstream connection down right away
    // rather than waiting for a later write to fail.
    let close_writer = writer.clone();
    data_channel.on_close(Box::new(move || {
        let writer = close_writer.clone();
        Box::pin(async move {
            info!("data channel closed, shutting down upstream bridge");
            if let Err(e) = writer.lock().await.shutdown().await {
                debug!("upstream write half already down: {e}");
            }
        })
    }));

    // Upstream -> channel, started once the channel is writable.
    let pump_channel = data_channel.clone();
    data_channel.on_open(Box::new(move || {
        Box::pin(async move {
            info!(
                "data channel '{}' open, pumping upstream bytes",
                pump_channel.label()
            );
            let mut buffer = [0u8; READ_BUFFER_SIZE];
            loop {
                let n = match reader.read(&mut buffer).await {
                    Ok(0) => {
                        info!("upstream {upstream_addr} closed, dropping bridge");
                        break;
                    }
                    Ok(n) => n,
                    Err(e) => {
                        warn!("failed to read from upstream {upstream_addr}: {e}");
                        break;
                    }
                };
                let chunk = Bytes::copy_from_slice(&buffer[..n]);
                if let Err(e) = pump_channel.send(&chunk).await {
                    warn!("failed to send to tunnel peer: {e}");
                    break;
                }
            }
            if let Err(e) = pump_channel.close().await {
                debug!("data channel already closed: {e}");
            }
        })
    }));
}
