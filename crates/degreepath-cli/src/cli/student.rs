//! Student profile commands: list, show, create.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use console::style;

use degreepath_client::TutorClient;
use degreepath_types::error::TutorError;
use degreepath_types::student::StudentProfile;

/// List all known students.
pub async fn list_students(client: &TutorClient, json: bool) -> anyhow::Result<()> {
    let students = client.list_students().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&students)?);
        return Ok(());
    }

    if students.is_empty() {
        println!("\n  {} No students registered yet.\n", style("·").dim());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Degree", "Major", "Completed", "Enrolled"]);

    for student in &students {
        table.add_row(vec![
            student.student_id.clone(),
            student.name.clone(),
            student.degree.clone(),
            student.major.clone().unwrap_or_default(),
            student.completed_units.join(", "),
            student.enrolled_units.join(", "),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Show one student profile in detail.
pub async fn show_student(
    client: &TutorClient,
    student_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let student = match client.get_student(student_id).await {
        Ok(student) => student,
        Err(TutorError::StudentNotFound) => {
            eprintln!(
                "\n  {} No student with id '{}'.",
                style("!").red().bold(),
                style(student_id).yellow()
            );
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&student)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} ({})",
        style("◆").cyan().bold(),
        style(&student.name).bold(),
        style(&student.student_id).dim()
    );
    println!("  Degree:    {}", student.degree);
    if let Some(major) = &student.major {
        println!("  Major:     {major}");
    }
    println!(
        "  Completed: {}",
        if student.completed_units.is_empty() {
            style("none").dim().to_string()
        } else {
            student.completed_units.join(", ")
        }
    );
    println!(
        "  Enrolled:  {}",
        if student.enrolled_units.is_empty() {
            style("none").dim().to_string()
        } else {
            student.enrolled_units.join(", ")
        }
    );
    println!();
    Ok(())
}

/// Register a new student profile.
#[allow(clippy::too_many_arguments)]
pub async fn create_student(
    client: &TutorClient,
    student_id: String,
    name: String,
    degree: String,
    major: Option<String>,
    completed: Vec<String>,
    enrolled: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let profile = StudentProfile {
        student_id,
        name,
        degree,
        major,
        completed_units: completed,
        enrolled_units: enrolled,
    };

    let created = client.create_student(&profile).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!(
            "\n  {} Registered {} ({}).\n",
            style("✓").green().bold(),
            style(&created.name).bold(),
            style(&created.student_id).dim()
        );
    }
    Ok(())
}
