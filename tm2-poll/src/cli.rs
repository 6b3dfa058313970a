// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tm2_common::HOST_BAUD_RATE;

use crate::commands;
use crate::transport::Transport;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "tm2-poll")]
#[command(about = "Poll a TM2 relay for latched GNSS time marks")]
pub struct Cli {
    /// Serial port (e.g., /dev/ttyAMA1)
    #[arg(short, long, default_value = "/dev/ttyAMA1")]
    pub port: String,

    /// Baud rate of the relay link
    #[arg(short, long, default_value_t = HOST_BAUD_RATE)]
    pub baud: u32,

    /// How long to wait for a reply line, in milliseconds
    #[arg(long, default_value = "10000")]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Request the latest time mark once and show the raw reply
    Once {
        /// GPS-UTC leap seconds to subtract
        #[arg(long, default_value = "0")]
        leap_seconds: i64,
    },

    /// Request time marks repeatedly and print each new one as UTC
    Poll {
        /// Delay between requests, in milliseconds
        #[arg(short, long, default_value = "500")]
        interval_ms: u64,

        /// Stop after printing this many time marks
        #[arg(short = 'n', long)]
        samples: Option<u64>,

        /// GPS-UTC leap seconds to subtract
        #[arg(long, default_value = "0")]
        leap_seconds: i64,
    },
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let mut transport = Transport::new(
        &cli.port,
        cli.baud,
        Duration::from_millis(cli.timeout_ms),
    )?;

    match cli.command {
        Commands::Once { leap_seconds } => commands::once(&mut transport, leap_seconds),
        Commands::Poll {
            interval_ms,
            samples,
            leap_seconds,
        } => commands::poll(
            &mut transport,
            Duration::from_millis(interval_ms),
            samples,
            leap_seconds,
        ),
    }
}
