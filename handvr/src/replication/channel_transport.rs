use crossbeam_channel::{Receiver, Sender, unbounded};

use super::{CommandTransport, HandCommand};
use crate::error::{HandError, HandResult};
use crate::hand::PeerId;

/// In-process session fabric: every peer gets an inbox and a sender into every
/// other peer's inbox. Payloads travel in their wire encoding so the JSON path
/// is exercised exactly as a network transport would.
pub struct ChannelHub;

impl ChannelHub {
    pub fn connect(peers: &[PeerId]) -> Vec<ChannelEndpoint> {
        let channels: Vec<(PeerId, Sender<Vec<u8>>, Receiver<Vec<u8>>)> = peers
            .iter()
            .map(|peer| {
                let (sender, receiver) = unbounded();
                (*peer, sender, receiver)
            })
            .collect();

        channels
            .iter()
            .map(|(peer, _, receiver)| ChannelEndpoint {
                peer: *peer,
                inbox: receiver.clone(),
                outboxes: channels
                    .iter()
                    .filter(|(other, _, _)| other != peer)
                    .map(|(other, sender, _)| (*other, sender.clone()))
                    .collect(),
            })
            .collect()
    }
}

pub struct ChannelEndpoint {
    peer: PeerId,
    inbox: Receiver<Vec<u8>>,
    outboxes: Vec<(PeerId, Sender<Vec<u8>>)>,
}

impl ChannelEndpoint {
    pub fn peer(&self) -> PeerId {
        self.peer
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl CommandTransport for ChannelEndpoint {
    fn broadcast(&mut self, command: &HandCommand) -> HandResult<()> {
        let payload = command.encode()?;
        let mut first_error = None;

        for (other, outbox) in &self.outboxes {
            if outbox.send(payload.clone()).is_err() {
                crate::replication_log!(
                    WARN,
                    from = %self.peer,
                    to = %other,
                    "peer inbox closed, dropping {}",
                    command.op.name()
                );
                if first_error.is_none() {
                    first_error = Some(HandError::TransportClosed(other.0));
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn drain(&mut self) -> Vec<HandCommand> {
        self.inbox
            .try_iter()
            .filter_map(|payload| match HandCommand::decode(&payload) {
                Ok(command) => Some(command),
                Err(err) => {
                    crate::replication_log!(WARN, peer = %self.peer, "discarding payload: {}", err);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{HandId, Handedness};
    use crate::replication::HandOp;
    use cgmath::vec3;

    fn teleport(sequence: u64) -> HandCommand {
        HandCommand {
            hand: HandId::new(PeerId(1), Handedness::Right),
            sequence,
            op: HandOp::Teleport {
                translation: vec3(1.0, 0.0, 0.0),
            },
        }
    }

    #[test]
    fn test_broadcast_reaches_every_other_peer_in_order() {
        let mut endpoints = ChannelHub::connect(&[PeerId(1), PeerId(2), PeerId(3)]);

        endpoints[0].broadcast(&teleport(1)).unwrap();
        endpoints[0].broadcast(&teleport(2)).unwrap();

        assert!(endpoints[0].drain().is_empty());
        for endpoint in &mut endpoints[1..] {
            let received = endpoint.drain();
            assert_eq!(received, vec![teleport(1), teleport(2)]);
        }
    }

    #[test]
    fn test_dropped_peer_reports_closed_transport() {
        let mut endpoints = ChannelHub::connect(&[PeerId(1), PeerId(2)]);
        let gone = endpoints.pop().unwrap();
        drop(gone);

        let err = endpoints[0].broadcast(&teleport(1)).unwrap_err();
        assert!(matches!(err, HandError::TransportClosed(2)));
    }
}
