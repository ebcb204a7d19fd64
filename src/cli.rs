//! Command line surface: a customer-facing `shop` and a password-gated `admin`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::OrderStatus;

#[derive(Debug, Parser)]
#[command(name = "order-desk")]
#[command(author, version, about = "Order desk for a small perfume shop", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./order-desk.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Customer commands
    Shop {
        #[command(subcommand)]
        command: ShopCommand,
    },
    /// Store administration
    Admin {
        /// Admin password
        #[arg(long)]
        password: String,
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ShopCommand {
    /// Show the catalogue with prices and stock
    Catalog,
    /// Ask the fragrance assistant
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Place an order
    Order(OrderArgs),
    /// Show the status of an order
    Track { order_id: String },
}

#[derive(Debug, Args)]
pub struct OrderArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub address: String,
    /// Free-form location, e.g. a maps link
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub product: String,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create an empty stock file if none exists
    Init,
    /// Manage stock
    Stock {
        #[command(subcommand)]
        command: StockCommand,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommand,
    },
    /// Order count, revenue and status breakdown
    Analytics,
    /// Ask the assistant in admin test mode
    Chat {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    List,
    /// Show one product
    Show { name: String },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        stock: u32,
    },
    /// Change any field of a product; omitted fields are kept
    Edit {
        name: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        stock: Option<u32>,
    },
    Remove { name: String },
}

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// List orders, most recent first
    List,
    /// Show every field of one order
    Show { order_id: String },
    /// Set the status of an order
    Status {
        order_id: String,
        /// Pending, Processing, Shipped, Delivered or Cancelled
        status: OrderStatus,
    },
}
