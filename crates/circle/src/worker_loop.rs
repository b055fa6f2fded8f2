use crate::backoff::Backoff;
use crate::context::Context;
use crate::error::CircleError;
use crate::handle::Handle;
use crate::summary::Summary;
use crate::token_ring::{TokenAction, TokenRing};
use crate::work_request::{self, WorkRequestState};
use circle_net::{Colour, Message};
use std::collections::HashMap;
use tokio::time::Instant;
use tracing::Instrument;

/// Runs the Worker Loop to termination, per §4.6:
///
/// 0. If no processor callback is registered, exits immediately (§6):
///    there is nothing this rank could do with drained items, so the steal/
///    termination protocol never even starts.
/// 1. (Checkpoint restore, if wanted, happens before this call via
///    [`Context::read_restarts`] — by the time `begin` runs the Local Queue
///    already holds whatever was restored.)
/// 2. The creator callback runs once, on rank 0 or every rank under
///    `CREATE_GLOBAL`.
/// 3. The steady-state loop: drain a processing batch, service messages, run
///    the idle-path work request, advance the token ring, periodically
///    reduce.
/// 4. Exits on `DONE` or a completed abort.
pub(crate) async fn begin(ctx: &mut Context) -> Result<Summary, CircleError> {
    let span = tracing::info_span!("rank", rank = ctx.rank);
    let result = run_loop(ctx).instrument(span).await;
    if let Err(CircleError::Substrate(ref err)) = result {
        crate::log_fatal!(rank = ctx.rank, error = %err, "substrate error ended the run");
    }
    result
}

async fn run_loop(ctx: &mut Context) -> Result<Summary, CircleError> {
    if ctx.processor.is_none() {
        return Ok(Summary {
            processed: 0,
            aborted: false,
        });
    }

    run_creator(ctx);

    let mut token_ring = TokenRing::new(ctx.rank, ctx.size);
    let mut work_state = WorkRequestState::new(ctx.rank, ctx.size);
    let mut backoff = Backoff::new();
    let mut round_in_flight = false;
    let mut pending_token: Option<Colour> = None;
    let mut reduce_totals: HashMap<usize, u64> = HashMap::new();
    let mut last_reduce = Instant::now();
    let mut aborting = false;

    loop {
        let did_work = drain_batch(ctx);

        let mut saw_message = false;
        while let Some((from, msg)) = ctx.substrate.try_recv() {
            saw_message = true;
            if let Some(outcome) = service_message(
                ctx,
                &mut token_ring,
                &mut work_state,
                &mut pending_token,
                &mut reduce_totals,
                &mut aborting,
                from,
                msg,
            )
            .await?
            {
                return Ok(outcome);
            }
        }

        if aborting {
            ctx.checkpoint()?;
            tracing::warn!(rank = ctx.rank, processed = ctx.processed, "aborted");
            return Ok(Summary {
                processed: ctx.processed,
                aborted: true,
            });
        }

        if ctx.queue.is_empty() {
            if !work_state.is_requesting() && ctx.size > 1 {
                let target = work_state.choose_target(ctx.rank, ctx.size, ctx.flags.split_equal());
                ctx.substrate.send_boxed(target, Message::RequestWork).await?;
                work_state.mark_requesting(target);
                tracing::debug!(rank = ctx.rank, target, "requested work");
            }

            if let Some(outcome) = advance_ring(
                ctx,
                &mut token_ring,
                &mut round_in_flight,
                &mut pending_token,
            )
            .await?
            {
                return Ok(outcome);
            }
        }

        if last_reduce.elapsed() >= ctx.config.reduce_interval {
            reduce_totals.insert(ctx.rank, ctx.processed);
            if ctx.rank == 0 {
                report_reduction(&reduce_totals);
            } else {
                ctx.substrate
                    .send_boxed(
                        0,
                        Message::Reduce {
                            processed: ctx.processed,
                        },
                    )
                    .await?;
            }
            last_reduce = Instant::now();
        }

        if !did_work && !saw_message {
            backoff.snooze().await;
        } else {
            backoff.reset();
        }
    }
}

fn run_creator(ctx: &mut Context) {
    if ctx.rank != 0 && !ctx.flags.create_global() {
        return;
    }
    let Some(mut creator) = ctx.creator.take() else {
        return;
    };
    let mut handle = Handle::new(&mut ctx.queue);
    creator(&mut handle);
}

/// Drains up to `processing_batch_size` items into the processor callback.
/// Returns whether any item was actually processed.
fn drain_batch(ctx: &mut Context) -> bool {
    let mut did_work = false;
    for _ in 0..ctx.config.processing_batch_size {
        if ctx.queue.is_empty() {
            break;
        }
        let Ok(item) = ctx.queue.pop() else {
            break;
        };
        if let Some(processor) = ctx.processor.as_mut() {
            let mut handle = Handle::new(&mut ctx.queue);
            processor(&mut handle, item);
        }
        ctx.processed += 1;
        did_work = true;
    }
    did_work
}

/// Services one already-received message. Returns `Some(summary)` if this
/// was the message that ends the Worker Loop (a `DONE` broadcast), `None`
/// otherwise.
#[allow(clippy::too_many_arguments)]
async fn service_message(
    ctx: &mut Context,
    token_ring: &mut TokenRing,
    work_state: &mut WorkRequestState,
    pending_token: &mut Option<Colour>,
    reduce_totals: &mut HashMap<usize, u64>,
    aborting: &mut bool,
    from: usize,
    msg: Message,
) -> Result<Option<Summary>, CircleError> {
    match msg {
        Message::RequestWork => {
            let k = work_request::split_count(ctx.queue.size());
            if k == 0 {
                ctx.substrate.send_boxed(from, Message::NoWork).await?;
            } else {
                let items = ctx.queue.split_off(k);
                ctx.substrate
                    .send_boxed(from, Message::WorkReply { items })
                    .await?;
                if from < ctx.rank {
                    token_ring.paint_black();
                }
            }
        }
        Message::WorkReply { items } => {
            for item in items {
                ctx.queue.push(&item)?;
            }
            token_ring.paint_black();
            work_state.clear_requesting();
        }
        Message::NoWork => {
            work_state.clear_requesting();
        }
        Message::Token { colour } => {
            if ctx.queue.is_empty() {
                if let Some(outcome) = dispatch_token(ctx, token_ring, colour).await? {
                    return Ok(Some(outcome));
                }
            } else {
                // Busy: hold the token until the next idle iteration, per
                // §4.3 ("a busy rank holds the token until it goes idle,
                // then forwards as above"). `advance_ring` checks
                // `pending_token` before deciding whether to initiate a
                // fresh round.
                *pending_token = Some(colour);
            }
        }
        Message::Abort => {
            *aborting = true;
        }
        Message::Done => {
            return Ok(Some(Summary {
                processed: ctx.processed,
                aborted: false,
            }));
        }
        Message::Reduce { processed } => {
            if ctx.rank == 0 {
                reduce_totals.insert(from, processed);
                report_reduction(reduce_totals);
            } else {
                tracing::warn!(rank = ctx.rank, from, "unexpected Reduce at non-root rank");
            }
        }
    }
    Ok(None)
}

/// Acts on a token this rank has just decided to handle while idle: forwards
/// it, or (rank 0 only) declares termination.
async fn dispatch_token(
    ctx: &mut Context,
    token_ring: &mut TokenRing,
    colour: Colour,
) -> Result<Option<Summary>, CircleError> {
    match token_ring.decide(colour, true) {
        TokenAction::Forward(out) => {
            ctx.substrate
                .send_boxed(token_ring.downstream(), Message::Token { colour: out })
                .await?;
            Ok(None)
        }
        TokenAction::Declare => {
            ctx.substrate.broadcast_boxed(Message::Done).await?;
            Ok(None) // this rank observes its own broadcast Done next iteration
        }
        TokenAction::Hold => unreachable!("idle=true is always passed here"),
    }
}

/// Idle-path token ring step: first drains a token this rank was holding
/// while busy, then — rank 0 only — initiates a fresh round if none is
/// currently circulating.
async fn advance_ring(
    ctx: &mut Context,
    token_ring: &mut TokenRing,
    round_in_flight: &mut bool,
    pending_token: &mut Option<Colour>,
) -> Result<Option<Summary>, CircleError> {
    if ctx.size == 1 {
        return dispatch_token(ctx, token_ring, Colour::White).await;
    }

    if let Some(colour) = pending_token.take() {
        return dispatch_token(ctx, token_ring, colour).await;
    }

    if ctx.rank == 0 && !*round_in_flight {
        let colour = token_ring.initiate();
        ctx.substrate
            .send_boxed(token_ring.downstream(), Message::Token { colour })
            .await?;
        *round_in_flight = true;
    }
    Ok(None)
}

fn report_reduction(totals: &HashMap<usize, u64>) {
    let total: u64 = totals.values().sum();
    tracing::info!(processed = total, "reduction");
}
