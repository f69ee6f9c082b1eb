//! Resolution engine: answers DNS questions from the record store.
//!
//! Stateless per query. Each question is looked up on its own, and a
//! question whose record is missing, or whose stored bytes are unusable,
//! simply contributes no answer.

use std::sync::Arc;

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::Record;
use kvdns_core::{normalize_name, RecordType, RecordValue};
use tracing::{debug, error, warn};

use crate::answer::to_rdata;
use crate::store::Store;

/// Authoritative resolver over a [`Store`].
#[derive(Debug, Clone)]
pub struct Resolver {
    store: Arc<Store>,
    ttl: u32,
}

impl Resolver {
    /// Create a resolver stamping `ttl` on every answer.
    #[must_use]
    pub const fn new(store: Arc<Store>, ttl: u32) -> Self {
        Self { store, ttl }
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Look up one record, logging and swallowing store errors.
    pub fn lookup(&self, rtype: RecordType, name: &str) -> Option<RecordValue> {
        match self.store.get(rtype, name) {
            Ok(value) => value,
            Err(e) => {
                error!(%rtype, %name, error = %e, "record lookup failed");
                None
            }
        }
    }

    /// Build the response to `request`.
    ///
    /// The response mirrors the id, opcode, RD flag and questions, and is
    /// always authoritative. It carries NXDOMAIN when no question produced
    /// an answer.
    #[must_use]
    pub fn resolve(&self, request: &Message) -> Message {
        let mut response = Message::new();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(request.op_code())
            .set_authoritative(true)
            .set_recursion_desired(request.recursion_desired());
        response.add_queries(request.queries().iter().cloned());

        if request.op_code() != OpCode::Query {
            response.set_response_code(ResponseCode::NotImp);
            return response;
        }

        let mut answered = 0usize;
        for query in request.queries() {
            if let Some(record) = self.answer(query) {
                response.add_answer(record);
                answered += 1;
            }
        }

        response.set_response_code(if answered == 0 {
            ResponseCode::NXDomain
        } else {
            ResponseCode::NoError
        });
        response
    }

    fn answer(&self, query: &Query) -> Option<Record> {
        let code = u16::from(query.query_type());
        let Some(rtype) = RecordType::from_code(code) else {
            debug!(qtype = %query.query_type(), "unsupported query type");
            return None;
        };
        let name = normalize_name(&query.name().to_ascii());
        let value = self.lookup(rtype, &name)?;

        match to_rdata(&value) {
            Ok(rdata) => {
                let mut record = Record::from_rdata(query.name().clone(), self.ttl, rdata);
                record.set_dns_class(query.query_class());
                Some(record)
            }
            Err(e) => {
                warn!(%rtype, %name, error = %e, "stored record cannot be served");
                None
            }
        }
    }
}
