mod domain;
mod clients;

mod app_system;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

mod actor_framework;
mod analytics;
mod assistant;
mod auth;
mod cli;
mod invoice;
mod order_actor;
mod product_actor;
mod store;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Instrument};

use crate::analytics::Summary;
use crate::app_system::{init_stock, setup_tracing, Config, OrderSystem};
use crate::assistant::Audience;
use crate::auth::AdminGate;
use crate::clients::Placement;
use crate::cli::{AdminCommand, Cli, Command, OrdersCommand, ShopCommand, StockCommand};
use crate::domain::{PlaceOrder, ProductCreate, ProductPatch};
use crate::invoice::invoice_lines;
use crate::store::StoreError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing once for the entire application
    setup_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    if let Command::Admin { password, .. } = &cli.command {
        AdminGate::new(&config.admin_password).verify(password)?;
    }

    // Init must run before the stock actor tries to load the file
    if let Command::Admin { command: AdminCommand::Init, .. } = &cli.command {
        if init_stock(&config).await? {
            println!("Created {}", config.stock_path.display());
        } else {
            println!("{} already exists", config.stock_path.display());
        }
        return Ok(());
    }

    let system = match OrderSystem::start(&config).await {
        Ok(system) => system,
        Err(e @ StoreError::Missing(_)) => {
            return Err(e).context("No stock yet, run `admin --password <PW> init` first");
        }
        Err(e @ StoreError::InvalidRecord { .. }) => {
            return Err(e).context("A store file holds a record that cannot be read; fix or remove it");
        }
        Err(e) => return Err(e).context("Could not open stores"),
    };

    let result = match cli.command {
        Command::Shop { command } => {
            let span = tracing::info_span!("shop");
            run_shop(&system, &config, command).instrument(span).await
        }
        Command::Admin { command, .. } => {
            let span = tracing::info_span!("admin");
            run_admin(&system, &config, command).instrument(span).await
        }
    };

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    result
}

async fn run_shop(system: &OrderSystem, config: &Config, command: ShopCommand) -> anyhow::Result<()> {
    match command {
        ShopCommand::Catalog => {
            let products = system.product_client.list_products().await?;
            if products.is_empty() {
                println!("No products in stock.");
            }
            for product in products {
                println!("{}", product.listing_line(&config.currency));
            }
        }
        ShopCommand::Ask { question } => {
            ask(system, config, &question.join(" "), Audience::Customer).await;
        }
        ShopCommand::Order(args) => {
            let Placement { order, invoice } = system
                .order_client
                .place_order(PlaceOrder {
                    name: args.name,
                    address: args.address,
                    location: args.location,
                    product: args.product,
                    quantity: args.quantity,
                })
                .await?;
            println!(
                "Order placed! ID: {} | {} x{} | Total: {} {}",
                order.id, order.product, order.quantity, config.currency, order.total
            );
            match invoice {
                Some(path) => println!("Invoice: {}", path.display()),
                None => println!("Invoice could not be generated."),
            }
        }
        ShopCommand::Track { order_id } => {
            let status = system.order_client.track_order(order_id.clone()).await?;
            println!("Order {}: {}", order_id, status);
        }
    }
    Ok(())
}

async fn run_admin(system: &OrderSystem, config: &Config, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        // Handled before the system starts
        AdminCommand::Init => {}
        AdminCommand::Stock { command } => run_stock(system, config, command).await?,
        AdminCommand::Orders { command: OrdersCommand::List } => {
            let orders = system.order_client.list_orders().await?;
            if orders.is_empty() {
                println!("No orders yet.");
            }
            for order in orders.iter().rev() {
                println!(
                    "{} | {} | {} | {} x{} | {} {} | {}",
                    order.id,
                    order.name,
                    order.address,
                    order.product,
                    order.quantity,
                    config.currency,
                    order.total,
                    order.status
                );
            }
        }
        AdminCommand::Orders { command: OrdersCommand::Show { order_id } } => {
            match system.order_client.get_order(order_id.clone()).await? {
                Some(order) => {
                    for line in invoice_lines(&order, &config.currency) {
                        println!("{}", line);
                    }
                }
                None => println!("Order {} not found", order_id),
            }
        }
        AdminCommand::Orders { command: OrdersCommand::Status { order_id, status } } => {
            let order = system.order_client.update_status(order_id, status).await?;
            println!("Order {} updated to {}", order.id, order.status);
        }
        AdminCommand::Analytics => {
            let orders = system.order_client.list_orders().await?;
            match Summary::from_orders(&orders) {
                None => println!("No data to show."),
                Some(summary) => {
                    println!("Total orders: {}", summary.total_orders);
                    println!("Revenue: {} {}", config.currency, summary.revenue);
                    for (status, count) in &summary.by_status {
                        println!("{}: {}", status, count);
                    }
                }
            }
        }
        AdminCommand::Chat { question } => {
            ask(system, config, &question.join(" "), Audience::Admin).await;
        }
    }
    Ok(())
}

async fn run_stock(system: &OrderSystem, config: &Config, command: StockCommand) -> anyhow::Result<()> {
    let products = &system.product_client;
    match command {
        StockCommand::List => {
            for product in products.list_products().await? {
                println!("{}", product.listing_line(&config.currency));
            }
        }
        StockCommand::Show { name } => match products.get_product(name.clone()).await? {
            Some(product) => println!("{}", product.listing_line(&config.currency)),
            None => println!("Product {} not found", name),
        },
        StockCommand::Add { name, category, size, price, stock } => {
            let product = products
                .create_product(ProductCreate { name, category, size, price, stock })
                .await?;
            println!("Added {}", product.listing_line(&config.currency));
        }
        StockCommand::Edit { name, category, size, price, stock } => {
            let product = products
                .update_product(name, ProductPatch { category, size, price, stock })
                .await?;
            println!("Updated {}", product.listing_line(&config.currency));
        }
        StockCommand::Remove { name } => {
            products.delete_product(name.clone()).await?;
            println!("Removed {}", name);
        }
    }
    Ok(())
}

/// Assistant failures are shown inline and do not fail the command.
async fn ask(system: &OrderSystem, config: &Config, question: &str, audience: Audience) {
    let assistant = match system.assistant(config) {
        Ok(assistant) => assistant,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };

    match assistant.answer(question, audience).await {
        Ok(answer) => println!("{}", answer),
        Err(e) => println!("Error: {}", e),
    }
}
