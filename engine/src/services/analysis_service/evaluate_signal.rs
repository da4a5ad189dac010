// Handler for the EvaluateSignal RPC
use tonic::{Response, Status};

use super::helpers::to_proto_signal;
use crate::services::{EvaluateSignalRequest, SignalResponse};
use crate::signals::{evaluate, SignalInputs};

pub fn handle_evaluate_signal(req_payload: EvaluateSignalRequest) -> Result<Response<SignalResponse>, Status> {
    let inputs = SignalInputs {
        close: req_payload.close,
        rsi: req_payload.rsi,
        ema_fast: req_payload.ema_fast,
        ema_slow: req_payload.ema_slow,
    };
    let signal = evaluate(inputs, req_payload.risk_distance)?;
    Ok(Response::new(to_proto_signal(&signal)))
}
