// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validate a purchase receipt file and print the decoded record.

use std::path::PathBuf;

use anyhow::Context as _;
use appreceipt::{load_and_decode, FileReceiptSource, InAppPurchaseReceipt, VerifyOptions};
use clap::Parser;

#[derive(Parser)]
#[command(name = "appreceipt-demo", about = "Validate and print a purchase receipt")]
struct Cli {
    /// Path to the receipt file (PKCS7 signed-data envelope, DER).
    #[arg(long)]
    receipt: PathBuf,

    /// Trusted root certificate (DER). May be given more than once.
    #[arg(long = "root")]
    roots: Vec<PathBuf>,

    /// Skip signature requirements and print the payload anyway (NOT for
    /// production use).
    #[arg(long)]
    insecure_skip_signature: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut options = VerifyOptions::new();
    for root in &cli.roots {
        let der = std::fs::read(root)
            .with_context(|| format!("failed to read root certificate {}", root.display()))?;
        options = options.with_trusted_root(der);
    }
    if cli.insecure_skip_signature {
        options = options.without_signature_verification();
    } else if cli.roots.is_empty() {
        anyhow::bail!("at least one --root is required (or pass --insecure-skip-signature)");
    }

    let source = FileReceiptSource::new(&cli.receipt);
    let receipt = load_and_decode(&source, &options)
        .with_context(|| format!("receipt {} did not validate", cli.receipt.display()))?;

    println!("bundle identifier:        {}", receipt.bundle_identifier);
    println!("app version:              {}", receipt.app_version);
    println!(
        "original app version:     {}",
        receipt.original_application_version
    );
    println!("creation date:            {}", receipt.receipt_creation_date);
    match receipt.receipt_expiration_date {
        Some(date) => println!("expiration date:          {date}"),
        None => println!("expiration date:          (none)"),
    }
    println!("opaque value:             {}", hex::encode(&receipt.opaque_value));
    println!("sha1:                     {}", hex::encode(&receipt.sha1));
    println!("in-app purchases:         {}", receipt.in_app_purchases.len());
    for purchase in &receipt.in_app_purchases {
        print_purchase(purchase);
    }

    Ok(())
}

fn print_purchase(purchase: &InAppPurchaseReceipt) {
    println!("  - product:              {}", purchase.product_identifier);
    println!("    quantity:             {}", purchase.quantity);
    println!("    transaction:          {}", purchase.transaction_identifier);
    println!(
        "    original transaction: {}",
        purchase.original_transaction_identifier
    );
    println!("    purchase date:        {}", purchase.purchase_date);
    println!(
        "    original purchase:    {}",
        purchase.original_purchase_date
    );
    if let Some(date) = purchase.subscription_expiration_date {
        println!("    subscription expires: {date}");
    }
    if let Some(period) = purchase.subscription_introductory_price_period {
        println!("    intro price period:   {period}");
    }
    if let Some(date) = purchase.cancellation_date {
        println!("    cancelled:            {date}");
    }
    println!(
        "    web order line item:  {}",
        purchase.web_order_line_item_id
    );
}
