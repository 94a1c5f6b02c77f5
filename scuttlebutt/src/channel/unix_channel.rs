use crate::{Channel, TrackChannel};
use std::{
    io::{BufReader, BufWriter},
    os::unix::net::UnixStream,
};

/// A Channel which uses UnixStreams. Each end can be moved to its own thread.
pub type UnixChannel = Channel<BufReader<UnixStream>, BufWriter<UnixStream>>;

/// A TrackChannel which uses UnixStreams.
pub type TrackUnixChannel = TrackChannel<UnixChannel>;

fn channel_pair() -> std::io::Result<(UnixChannel, UnixChannel)> {
    let (tx, rx) = UnixStream::pair()?;
    let sender = Channel::new(BufReader::new(tx.try_clone()?), BufWriter::new(tx));
    let receiver = Channel::new(BufReader::new(rx.try_clone()?), BufWriter::new(rx));
    Ok((sender, receiver))
}

/// Convenience function to create a pair of UnixChannels for local tests.
///
/// # Panics
/// Panics if the operating system refuses to create a socket pair.
pub fn unix_channel_pair() -> (UnixChannel, UnixChannel) {
    channel_pair().expect("unable to create a unix socket pair")
}

/// Convenience function to create a pair of TrackUnixChannels for local tests.
///
/// # Panics
/// Panics if the operating system refuses to create a socket pair.
pub fn track_unix_channel_pair() -> (TrackUnixChannel, TrackUnixChannel) {
    let (sender, receiver) = unix_channel_pair();
    (TrackChannel::new(sender), TrackChannel::new(receiver))
}
