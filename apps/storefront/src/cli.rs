//! # `goonj` Command Line
//!
//! ```text
//! goonj orders list [--user <uid>] [--operator <email>]
//! goonj orders show <order-id> --operator <email>
//! goonj orders set-status <order-id> <status> [--tracking <no>] --operator <email>
//! goonj orders confirm-payment <order-id> <gw-order-id> <gw-payment-id> --operator <email>
//! goonj users list --operator <email>
//! goonj checkout --uid <uid> --email <email> --name <name> --book <id>... [--method ...]
//! ```

use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use goonj_core::{Address, Cart, Order, OrderStatus, PaymentMethod, User};

use crate::catalog::load_catalog;
use crate::checkout::{
    AttemptResolution, AttemptStatus, CheckoutDeps, CheckoutWorkflow, PlacementOutcome,
    SimulatedGateway, SimulatedOutcome, StoreProfile,
};
use crate::error::{ApiError, ErrorCode};
use crate::identity::identity_for_email;
use crate::Storefront;

#[derive(Debug, Parser)]
#[command(name = "goonj", about = "Goonj storefront operator CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect and update placed orders
    Orders(OrdersCommand),
    /// Inspect the user directory
    Users(UsersCommand),
    /// Run one checkout against the simulated gateway
    Checkout(CheckoutArgs),
}

impl Cli {
    pub async fn execute(self, store: &Storefront) -> Result<(), ApiError> {
        match self.command {
            Command::Orders(command) => run_orders(command.command, store).await,
            Command::Users(command) => run_users(command.command, store).await,
            Command::Checkout(args) => run_checkout(args, store).await,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Args)]
struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List orders, newest first
    List {
        /// Only this user's orders (their own history)
        #[arg(long)]
        user: Option<String>,
        /// Operator e-mail, required without --user
        #[arg(long)]
        operator: Option<String>,
    },
    /// Show one order in full
    Show {
        order_id: String,
        #[arg(long)]
        operator: String,
    },
    /// Set an order's status
    SetStatus {
        order_id: String,
        /// pending | confirmed | shipped | delivered | cancelled
        status: OrderStatus,
        #[arg(long)]
        tracking: Option<String>,
        #[arg(long)]
        operator: String,
    },
    /// Record gateway ids and mark the order confirmed
    ConfirmPayment {
        order_id: String,
        gateway_order_id: String,
        gateway_payment_id: String,
        #[arg(long)]
        operator: String,
    },
}

async fn run_orders(command: OrdersSubcommand, store: &Storefront) -> Result<(), ApiError> {
    let manager = store.status_manager();

    match command {
        OrdersSubcommand::List { user, operator } => {
            let orders = match user {
                Some(uid) => manager.order_history(Some(&identity_for_email(&uid))).await?,
                None => {
                    let operator = operator.map(|email| identity_for_email(&email));
                    manager.list_orders(operator.as_ref()).await?
                }
            };
            print_orders(&orders);
        }
        OrdersSubcommand::Show { order_id, operator } => {
            let operator = identity_for_email(&operator);
            let order = manager.get_order(Some(&operator), &order_id).await?;
            print_order(&order);
        }
        OrdersSubcommand::SetStatus {
            order_id,
            status,
            tracking,
            operator,
        } => {
            let operator = identity_for_email(&operator);
            manager
                .update_status(Some(&operator), &order_id, status, tracking)
                .await?;
            println!("{} -> {}", order_id, status);
        }
        OrdersSubcommand::ConfirmPayment {
            order_id,
            gateway_order_id,
            gateway_payment_id,
            operator,
        } => {
            let operator = identity_for_email(&operator);
            manager
                .confirm_payment(Some(&operator), &order_id, &gateway_order_id, &gateway_payment_id)
                .await?;
            println!("{} -> {}", order_id, OrderStatus::Confirmed);
        }
    }

    Ok(())
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("no orders");
        return;
    }

    println!(
        "{:<36}  {:<24}  {:<9}  {:>10}  {:<16}  {}",
        "ORDER", "USER", "STATUS", "TOTAL", "PAYMENT", "PLACED"
    );
    for order in orders {
        println!(
            "{:<36}  {:<24}  {:<9}  {:>10}  {:<16}  {}",
            order.id,
            order.user_id,
            order.status.as_str(),
            order.total().to_string(),
            order.payment_method.label(),
            order.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn print_order(order: &Order) {
    println!("order:     {}", order.id);
    println!("user:      {}", order.user_id);
    println!("status:    {}", order.status);
    println!("payment:   {}", order.payment_method.label());
    if let Some(id) = &order.gateway_payment_id {
        println!("gateway:   {} / {}", order.gateway_order_id.as_deref().unwrap_or("-"), id);
    }
    println!("tracking:  {}", order.tracking_number.as_deref().unwrap_or("-"));
    println!("placed:    {}", order.created_at.to_rfc3339());
    println!("updated:   {}", order.updated_at.to_rfc3339());
    println!(
        "ship to:   {}, {} {}, {}, {} {} ({})",
        order.address.full_name,
        order.address.house_number,
        order.address.street_name,
        order.address.city,
        order.address.state,
        order.address.pincode,
        order.address.phone,
    );
    println!();
    for line in &order.items {
        println!(
            "  {:>3} x {:<40} {:>10}",
            line.quantity,
            line.book.title,
            line.line_total().to_string()
        );
    }
    println!("  {:>56}", format!("total {}", order.total()));
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Args)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Debug, Subcommand)]
enum UsersSubcommand {
    /// List known users by display name
    List {
        #[arg(long)]
        operator: String,
    },
}

async fn run_users(command: UsersSubcommand, store: &Storefront) -> Result<(), ApiError> {
    match command {
        UsersSubcommand::List { operator } => {
            let operator = identity_for_email(&operator);
            let users = store.status_manager().list_users(Some(&operator)).await?;
            if users.is_empty() {
                println!("no users");
                return Ok(());
            }
            println!("{:<28}  {:<32}  {}", "UID", "EMAIL", "NAME");
            for user in users {
                println!("{:<28}  {:<32}  {}", user.uid, user.email, user.display_name);
            }
        }
    }
    Ok(())
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Cod,
    Gateway,
    Upi,
    Card,
}

#[derive(Debug, Args)]
struct AddressArgs {
    /// Recipient name (defaults to --name)
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    house_number: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    pincode: String,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    #[arg(long)]
    uid: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,

    /// Catalog book id; repeat to add more copies or books
    #[arg(long = "book", required = true)]
    books: Vec<i64>,

    #[arg(long, value_enum, default_value_t = MethodArg::Cod)]
    method: MethodArg,
    #[arg(long)]
    upi_id: Option<String>,
    #[arg(long)]
    card_number: Option<String>,
    #[arg(long)]
    expiry: Option<String>,
    #[arg(long)]
    cvv: Option<String>,

    #[command(flatten)]
    address: AddressArgs,

    /// Make the simulated gateway decline with this reason
    #[arg(long)]
    decline: Option<String>,
}

impl CheckoutArgs {
    fn payment_method(&self) -> PaymentMethod {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        match self.method {
            MethodArg::Cod => PaymentMethod::CashOnDelivery,
            MethodArg::Gateway => PaymentMethod::GatewayRedirect,
            MethodArg::Upi => PaymentMethod::Upi {
                upi_id: text(&self.upi_id),
            },
            MethodArg::Card => PaymentMethod::Card {
                card_number: text(&self.card_number),
                expiry_date: text(&self.expiry),
                cvv: text(&self.cvv),
            },
        }
    }

    fn address(&self) -> Address {
        Address {
            full_name: self.address.full_name.clone().unwrap_or_else(|| self.name.clone()),
            phone: self.address.phone.clone(),
            house_number: self.address.house_number.clone(),
            street_name: self.address.street.clone(),
            city: self.address.city.clone(),
            state: self.address.state.clone(),
            pincode: self.address.pincode.clone(),
        }
    }
}

async fn run_checkout(args: CheckoutArgs, store: &Storefront) -> Result<(), ApiError> {
    let catalog = load_catalog(&store.config.catalog_path)?;

    let user = User {
        uid: args.uid.clone(),
        email: args.email.clone(),
        display_name: args.name.clone(),
        photo_url: None,
    };
    store.db.users().upsert(&user).await?;

    let mut cart = Cart::new();
    for id in &args.books {
        cart.add(catalog.get(*id)?.clone());
    }

    let outcome = match &args.decline {
        Some(reason) => SimulatedOutcome::Decline {
            reason: reason.clone(),
        },
        None => SimulatedOutcome::Approve,
    };
    let gateway = SimulatedGateway::new(store.config.gateway_key.clone(), store.config.gateway_delay)
        .with_outcome(outcome);
    let deps = CheckoutDeps::new(Arc::new(store.db.orders()), Arc::new(gateway)).with_store(
        StoreProfile {
            name: store.config.store_name.clone(),
            currency: store.config.currency.clone(),
        },
    );

    let workflow = CheckoutWorkflow::begin(Some(user), cart, deps)?;
    workflow.submit_address(args.address()).await?;
    workflow.select_payment(args.payment_method()).await?;

    let total = workflow.cart().await.total();
    let order_id = match workflow.place_order().await? {
        PlacementOutcome::Placed { order_id } => order_id,
        PlacementOutcome::AwaitingGateway {
            attempt_id,
            gateway_order_id,
        } => {
            println!("waiting for gateway ({})", gateway_order_id);
            info!(attempt_id = %attempt_id, "Waiting for gateway callback");
            wait_for_gateway(&workflow).await?
        }
    };

    println!("placed {} for {}", order_id, total);
    Ok(())
}

async fn wait_for_gateway(workflow: &CheckoutWorkflow) -> Result<String, ApiError> {
    let mut status = workflow.attempt_status();
    let resolved = status
        .wait_for(AttemptStatus::is_resolved)
        .await
        .map_err(|_| ApiError::internal("Checkout session closed before the gateway answered"))?
        .clone();

    match resolved {
        AttemptStatus::Resolved(AttemptResolution::Placed { order_id }) => Ok(order_id),
        AttemptStatus::Resolved(AttemptResolution::Declined { reason }) => {
            Err(ApiError::payment_failure(reason))
        }
        AttemptStatus::Resolved(AttemptResolution::PersistenceFailed { reason }) => {
            Err(ApiError::new(ErrorCode::PersistenceError, reason))
        }
        other => Err(ApiError::internal(format!("Unexpected gateway status: {:?}", other))),
    }
}
