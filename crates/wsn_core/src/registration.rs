//! Handshake de registro: máquina de estados do sensor e regra de admissão
//! do coletor.

use crate::protocol::Frame;
use crate::types::{
    NODE_ID_RESERVED_HIGH, NODE_ID_RESERVED_LOW, NodeId, RegistrationState, RegistrationStatus,
};
use tracing::{debug, info, warn};

/// Efeito de um `REGISTER_ACK` sobre o estado local.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// Ack para outro nó, sem transição.
    Ignored,
    Registered,
    Rejected,
}

/// Estado de registro de um nó, do início ao fim do processo.
///
/// Só vai para `Registered` com um ack aceito para o próprio id. Não existe
/// expiração: um nó registrado continua registrado.
#[derive(Debug, Clone)]
pub struct Registration {
    node_id: NodeId,
    state: RegistrationState,
}

impl Registration {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            state: RegistrationState::Unregistered,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    pub fn is_registered(&self) -> bool {
        self.state.is_registered()
    }

    /// Tick de verificação de registro.
    ///
    /// Retorna o `REGISTER_REQUEST` a enviar quando o nó ainda não está
    /// registrado e o root é alcançável. O estado não muda aqui.
    pub fn on_check_tick(&self, root_reachable: bool) -> Option<Frame> {
        if self.is_registered() {
            return None;
        }
        if !root_reachable {
            debug!("Root inalcançável, registro adiado");
            return None;
        }
        Some(Frame::RegisterRequest {
            node_id: self.node_id,
        })
    }

    /// Aplica um `REGISTER_ACK` recebido.
    pub fn on_ack(&mut self, node_id: NodeId, status: RegistrationStatus) -> AckOutcome {
        if node_id != self.node_id {
            debug!("Ack para o nó {node_id} ignorado (local: {})", self.node_id);
            return AckOutcome::Ignored;
        }

        if status.is_accepted() {
            if !self.is_registered() {
                info!("Nó {} registrado no coletor", self.node_id);
            }
            self.state = RegistrationState::Registered;
            AckOutcome::Registered
        } else {
            warn!("Registro do nó {} rejeitado", self.node_id);
            self.state = RegistrationState::Unregistered;
            AckOutcome::Rejected
        }
    }
}

/// Regra de admissão do coletor: sem estado, idempotente.
///
/// Aceita qualquer id exceto os reservados `0x00` e `0xFF`.
pub fn admit(node_id: NodeId) -> RegistrationStatus {
    if node_id != NODE_ID_RESERVED_LOW && node_id != NODE_ID_RESERVED_HIGH {
        RegistrationStatus::Accepted
    } else {
        RegistrationStatus::Rejected
    }
}

/// Monta o `REGISTER_ACK` de resposta para um pedido.
pub fn answer_request(node_id: NodeId) -> Frame {
    Frame::RegisterAck {
        node_id,
        status: admit(node_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_rule() {
        assert_eq!(
            answer_request(0xAA),
            Frame::RegisterAck {
                node_id: 0xAA,
                status: RegistrationStatus::Accepted
            }
        );
        assert_eq!(admit(0x00), RegistrationStatus::Rejected);
        assert_eq!(admit(0xFF), RegistrationStatus::Rejected);
        assert_eq!(admit(0x01), RegistrationStatus::Accepted);
        assert_eq!(admit(0xFE), RegistrationStatus::Accepted);
    }

    #[test]
    fn admission_is_idempotent() {
        assert_eq!(answer_request(0x42), answer_request(0x42));
    }

    #[test]
    fn check_tick_requests_only_when_reachable() {
        let reg = Registration::new(0xAA);
        assert_eq!(reg.on_check_tick(false), None);
        assert_eq!(
            reg.on_check_tick(true),
            Some(Frame::RegisterRequest { node_id: 0xAA })
        );
        // Sem transição otimista
        assert!(!reg.is_registered());
    }

    #[test]
    fn accepted_ack_registers() {
        let mut reg = Registration::new(0xAA);
        assert_eq!(
            reg.on_ack(0xAA, RegistrationStatus::Accepted),
            AckOutcome::Registered
        );
        assert!(reg.is_registered());
        assert_eq!(reg.on_check_tick(true), None);
    }

    #[test]
    fn foreign_ack_is_ignored() {
        let mut reg = Registration::new(0xAA);
        assert_eq!(
            reg.on_ack(0xAB, RegistrationStatus::Accepted),
            AckOutcome::Ignored
        );
        assert!(!reg.is_registered());

        reg.on_ack(0xAA, RegistrationStatus::Accepted);
        assert_eq!(
            reg.on_ack(0xAB, RegistrationStatus::Rejected),
            AckOutcome::Ignored
        );
        assert!(reg.is_registered());
    }

    #[test]
    fn rejected_ack_returns_to_unregistered() {
        let mut reg = Registration::new(0xAA);
        reg.on_ack(0xAA, RegistrationStatus::Accepted);
        assert_eq!(
            reg.on_ack(0xAA, RegistrationStatus::Rejected),
            AckOutcome::Rejected
        );
        assert_eq!(reg.state(), RegistrationState::Unregistered);
    }
}
