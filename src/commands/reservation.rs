//! Reservation CLI commands.
//!
//! Every command acts as a known user (`--as`). That user's role decides,
//! through [`tablebook_service::ReservationAccess`], which reservations
//! the command may touch.

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};

use tablebook_core::config::AppConfig;
use tablebook_core::error::AppError;
use tablebook_core::types::{ReservationId, UserId};
use tablebook_service::{RequestContext, ReservationRequest};

use super::{Engine, engine_error, parse_time};
use crate::output::{self, OutputFormat, ReservationRow};

/// Arguments for reservation commands
#[derive(Debug, Args)]
pub struct ReservationArgs {
    /// ID of the user performing the command
    #[arg(long = "as", value_name = "USER_ID")]
    pub acting_user: UserId,

    /// Reservation subcommand
    #[command(subcommand)]
    pub command: ReservationCommand,
}

/// Reservation subcommands
#[derive(Debug, Subcommand)]
pub enum ReservationCommand {
    /// Book a table
    Create {
        /// Owner of the reservation (admins only; defaults to the acting user)
        #[arg(long)]
        user: Option<UserId>,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Time (HH:MM)
        #[arg(short, long, value_parser = parse_time)]
        time: NaiveTime,
        /// Number of guests
        #[arg(short, long)]
        people: i32,
        /// Seating area (indoor, outdoor)
        #[arg(short, long)]
        area: String,
    },
    /// Change a reservation; omitted fields keep their current value
    Update {
        /// Reservation ID
        id: ReservationId,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// New time (HH:MM)
        #[arg(short, long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// New number of guests
        #[arg(short, long)]
        people: Option<i32>,
        /// New seating area
        #[arg(short, long)]
        area: Option<String>,
    },
    /// Cancel a reservation
    Delete {
        /// Reservation ID
        id: ReservationId,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Show one reservation
    Get {
        /// Reservation ID
        id: ReservationId,
    },
    /// List reservations
    List {
        /// Only this user's reservations (defaults to the acting user unless admin)
        #[arg(long)]
        user: Option<UserId>,
        /// Only this date
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        date: Option<NaiveDate>,
        /// Range start (inclusive)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Range end (inclusive)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
}

/// Execute reservation commands
pub async fn execute(
    args: &ReservationArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = Engine::connect(config).await?;
    let result = run(&engine, args, format).await;
    engine.db.close().await;
    result
}

async fn run(engine: &Engine, args: &ReservationArgs, format: OutputFormat) -> Result<(), AppError> {
    let acting = engine
        .users
        .find_by_id(args.acting_user)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", args.acting_user)))?;
    let ctx = RequestContext::from(&acting);

    match &args.command {
        ReservationCommand::Create {
            user,
            date,
            time,
            people,
            area,
        } => {
            let owner = user.unwrap_or(ctx.user_id);
            engine
                .access
                .authorize_owner_of(&ctx, owner)
                .map_err(engine_error)?;

            let created = engine
                .service
                .create_reservation(owner, ReservationRequest::new(*date, *time, *people, area))
                .await
                .map_err(engine_error)?;

            output::print_success(&format!("Reservation {} created", created.id));
            output::print_reservation(&created, format);
        }
        ReservationCommand::Update {
            id,
            date,
            time,
            people,
            area,
        } => {
            engine
                .access
                .authorize(&ctx, *id)
                .await
                .map_err(engine_error)?;

            let current = engine
                .service
                .get_reservation(*id)
                .await
                .map_err(engine_error)?;
            let request = ReservationRequest::new(
                date.unwrap_or(current.reservation_date),
                time.unwrap_or(current.reservation_time),
                people.unwrap_or(current.party_size),
                area.clone()
                    .unwrap_or_else(|| current.area.as_str().to_string()),
            );

            let updated = engine
                .service
                .update_reservation(*id, request)
                .await
                .map_err(engine_error)?;

            output::print_success(&format!("Reservation {} updated", updated.id));
            output::print_reservation(&updated, format);
        }
        ReservationCommand::Delete { id, force } => {
            engine
                .access
                .authorize(&ctx, *id)
                .await
                .map_err(engine_error)?;

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Cancel reservation {id}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = engine
                .service
                .delete_reservation(*id)
                .await
                .map_err(engine_error)?;
            output::print_success(&format!("Reservation {} deleted", deleted.id));
        }
        ReservationCommand::Get { id } => {
            engine
                .access
                .authorize(&ctx, *id)
                .await
                .map_err(engine_error)?;

            let reservation = engine
                .service
                .get_reservation(*id)
                .await
                .map_err(engine_error)?;
            output::print_reservation(&reservation, format);
        }
        ReservationCommand::List {
            user,
            date,
            from,
            to,
        } => {
            // Non-admins only ever see their own reservations.
            let owner = match user {
                Some(user) => Some(*user),
                None if ctx.is_admin() => None,
                None => Some(ctx.user_id),
            };
            if let Some(owner) = owner {
                engine
                    .access
                    .authorize_owner_of(&ctx, owner)
                    .map_err(engine_error)?;
            }

            let mut reservations = match (date, from, to) {
                (Some(date), _, _) => engine.service.list_by_date(*date).await,
                (None, Some(from), Some(to)) => engine.service.list_between(*from, *to).await,
                _ => match owner {
                    Some(owner) => engine.service.list_by_user(owner).await,
                    None => engine.service.list_all().await,
                },
            }
            .map_err(engine_error)?;

            if let Some(owner) = owner {
                reservations.retain(|r| r.user_id == owner);
            }

            let rows: Vec<ReservationRow> =
                reservations.iter().map(ReservationRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
