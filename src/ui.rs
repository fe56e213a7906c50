// UI layer: provides a simple interactive menu using `dialoguer`.
// The functions are small and synchronous to make the flow easy to follow.

use crate::api::{LicenseRef, MediaSubmission, MetaMediaClient};
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

/// Main interactive menu. Receives a `MetaMediaClient` instance and runs
/// a simple select loop until the user chooses "Exit".
///
/// Note: `Select::interact()` is keyboard-driven: you can use arrow keys
/// and Enter to choose an option.
pub fn main_menu(api: MetaMediaClient) -> Result<()> {
    loop {
        let items = vec!["List axes", "List licenses", "Submit media", "Exit"];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => {
                handle_list_axes(&api)?;
            }
            1 => {
                handle_list_licenses(&api)?;
            }
            2 => {
                handle_submit(&api)?;
            }
            3 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Fetch and print the classification axes, one per line.
fn handle_list_axes(api: &MetaMediaClient) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Fetching axes...");

    let result = api.list_axes();
    spinner.finish_and_clear();
    match result {
        Ok(axes) => {
            println!("Axes:");
            for axis in axes {
                println!("{} {} {}", axis.name, axis.left_term, axis.right_term);
            }
        }
        Err(e) => println!("Fetching axes failed: {}", e),
    }
    Ok(())
}

/// Fetch and print the license definitions, one per line.
fn handle_list_licenses(api: &MetaMediaClient) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Fetching licenses...");

    let result = api.list_licenses();
    spinner.finish_and_clear();
    match result {
        Ok(licenses) => {
            println!("Licenses:");
            for license in licenses {
                println!("{} {}", license.name, license.url);
            }
        }
        Err(e) => println!("Fetching licenses failed: {}", e),
    }
    Ok(())
}

/// Collect the submission fields, ask for confirmation and call
/// `MetaMediaClient::submit_media`.
fn handle_submit(api: &MetaMediaClient) -> Result<()> {
    // `Input::interact_text()` prompts the user for input and returns it.
    let title: String = Input::new().with_prompt("Title").interact_text()?;
    let excerpt: String = Input::new().with_prompt("Excerpt").interact_text()?;
    let content: String = Input::new().with_prompt("Content").interact_text()?;
    let creator: String = Input::new().with_prompt("Original creator").interact_text()?;
    let url: String = Input::new().with_prompt("Original URL").interact_text()?;
    let license = pick_license(api)?;
    let language: String = Input::new()
        .with_prompt("Language code (two-letter, upper-case, e.g. EN)")
        .interact_text()?;

    let media = MediaSubmission {
        title,
        excerpt,
        content,
        creator,
        url,
        license,
        language,
    };

    if !Confirm::new().with_prompt("Submit this media?").interact()? {
        println!("Submission cancelled.");
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Submitting...");

    let result = api.submit_media(&media);
    spinner.finish_and_clear();
    match result {
        Ok(_) => println!("Media submitted."),
        Err(e) => println!("Submission failed: {}", e),
    }
    Ok(())
}

/// Let the user pick a license from the server's list. When the list
/// cannot be fetched, fall back to a manually entered numeric id.
fn pick_license(api: &MetaMediaClient) -> Result<LicenseRef> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Fetching licenses...");

    let result = api.list_licenses();
    spinner.finish_and_clear();
    match result {
        Ok(mut licenses) => {
            let names: Vec<String> = licenses
                .iter()
                .map(|license| format!("{} ({})", license.name, license.url))
                .collect();
            let selection = Select::new().items(&names).default(0).interact()?;
            Ok(LicenseRef::License(licenses.remove(selection)))
        }
        Err(e) => {
            println!("Fetching licenses failed: {}", e);
            let id: i64 = Input::new().with_prompt("License id").interact_text()?;
            Ok(LicenseRef::Id(id))
        }
    }
}
