//! Catalog, enrollment, wishlist and payment actions.

use crate::cli::actions::context::Context;
use crate::features::auth::Role;
use crate::features::courses::{self, Course, CourseQuery, NewCourse};
use crate::features::payments::{self, PaymentStatus};
use crate::features::teachers::cache::UNKNOWN_TEACHER;
use crate::features::{comments, lessons, wishlist};
use anyhow::{Context as _, Result};
use std::collections::HashMap;
use tokio::task::JoinSet;

#[derive(Debug)]
pub enum WishlistOp {
    Show,
    Add(String),
    Remove(String),
}

#[derive(Debug)]
pub enum Command {
    Courses(CourseQuery),
    Course { id: String },
    Enroll { id: String },
    Enrollments,
    Lessons { course_id: String },
    Comments { course_id: String, post: Option<String> },
    Wishlist(WishlistOp),
    Payments { id: Option<String> },
    Checkout { course_id: String },
    Teacher { ids: Vec<String> },
    Teaching,
    Publish(NewCourse),
}

/// # Errors
/// Returns an error if the request fails or the caller lacks the required role.
pub async fn execute(context: &Context, command: Command) -> Result<()> {
    let api = context.api();

    match command {
        Command::Courses(query) => {
            let courses = courses::list_courses(api, &query)
                .await
                .context("failed to list courses")?;
            print_courses(context, &courses).await;
        }
        Command::Course { id } => {
            let course = courses::get_course(api, &id)
                .await
                .with_context(|| format!("failed to load course {id}"))?;
            let teacher = match course.teacher_id.as_deref() {
                Some(teacher_id) => context.teachers.display_name(teacher_id).await,
                None => UNKNOWN_TEACHER.to_string(),
            };
            println!("{}  (#{})", course.title, course.id);
            println!("teacher: {teacher}");
            if let Some(price) = course.price {
                println!("price:   {price:.2}");
            }
            if let Some(category) = &course.category {
                println!("category: {category}");
            }
            if let Some(description) = &course.description {
                println!("\n{description}");
            }
        }
        Command::Enroll { id } => {
            context.signed_in().await?;
            let enrollment = courses::enroll(api, &id)
                .await
                .with_context(|| format!("failed to enroll in course {id}"))?;
            println!("Enrolled in course {} (enrollment #{})", enrollment.course_id, enrollment.id);
        }
        Command::Enrollments => {
            context.signed_in().await?;
            for enrollment in courses::my_enrollments(api).await? {
                println!(
                    "{:>6}  course {:<8}  {:>5.1}%",
                    enrollment.id,
                    enrollment.course_id,
                    enrollment.progress.unwrap_or_default()
                );
            }
        }
        Command::Lessons { course_id } => {
            for lesson in lessons::list_lessons(api, &course_id).await? {
                let position = lesson
                    .position
                    .map_or_else(|| "-".to_string(), |position| position.to_string());
                println!("{position:>3}. {}", lesson.title);
            }
        }
        Command::Comments { course_id, post } => match post {
            Some(content) => {
                context.signed_in().await?;
                let comment = comments::post_comment(api, &course_id, &content)
                    .await
                    .context("failed to post comment")?;
                println!("Posted comment #{}", comment.id);
            }
            None => {
                for comment in comments::list_comments(api, &course_id).await? {
                    println!(
                        "[{}] {}: {}",
                        comment.created_at.as_deref().unwrap_or("-"),
                        comment.author_name.as_deref().unwrap_or("anonymous"),
                        comment.content
                    );
                }
            }
        },
        Command::Wishlist(op) => {
            context.signed_in().await?;
            let mut set = wishlist::WishlistSet::new();
            set.refresh(api).await.context("failed to load wishlist")?;

            match op {
                WishlistOp::Show => {
                    let mut ids: Vec<&str> = set.iter().collect();
                    ids.sort_unstable();
                    println!("{} course(s) on the wishlist", set.len());
                    for id in ids {
                        println!("  {id}");
                    }
                }
                WishlistOp::Add(course_id) if set.contains(&course_id) => {
                    println!("Course {course_id} is already on the wishlist");
                }
                WishlistOp::Remove(course_id) if !set.contains(&course_id) => {
                    println!("Course {course_id} is not on the wishlist");
                }
                WishlistOp::Add(course_id) | WishlistOp::Remove(course_id) => {
                    let listed = set.toggle(api, &course_id).await?;
                    let verb = if listed { "Added" } else { "Removed" };
                    println!("{verb} course {course_id}");
                }
            }
        }
        Command::Payments { id } => {
            context.signed_in().await?;
            match id {
                Some(id) => print_payment(&payments::payment_status(api, &id).await?),
                None => {
                    for payment in payments::my_payments(api).await? {
                        print_payment(&payment);
                    }
                }
            }
        }
        Command::Checkout { course_id } => {
            context.signed_in().await?;
            let checkout = payments::checkout(api, &course_id)
                .await
                .context("checkout failed")?;
            println!("Payment #{} created", checkout.payment_id);
            if let Some(url) = checkout.checkout_url {
                println!("Complete payment at {url}");
            }
        }
        Command::Teacher { ids } => {
            let names = resolve_teachers(context, ids.iter().map(String::as_str)).await;
            for id in &ids {
                let name = names.get(id.trim()).map_or(UNKNOWN_TEACHER, String::as_str);
                println!("{id}: {name}");
            }
        }
        Command::Teaching => {
            context.require(Role::Teacher).await?;
            let courses = courses::teacher_courses(api).await?;
            print_courses(context, &courses).await;
        }
        Command::Publish(course) => {
            context.require(Role::Teacher).await?;
            let created = courses::create_course(api, &course)
                .await
                .context("failed to create course")?;
            println!("Created course #{} {}", created.id, created.title);
        }
    }

    Ok(())
}

async fn print_courses(context: &Context, courses: &[Course]) {
    let names = resolve_teachers(
        context,
        courses.iter().filter_map(|course| course.teacher_id.as_deref()),
    )
    .await;

    for course in courses {
        let teacher = course
            .teacher_id
            .as_deref()
            .and_then(|id| names.get(id.trim()))
            .map_or(UNKNOWN_TEACHER, String::as_str);
        let price = course
            .price
            .map_or_else(|| "free".to_string(), |price| format!("{price:.2}"));
        println!("{:>6}  {:<40}  {:<24}  {price}", course.id, course.title, teacher);
    }
}

/// Resolves teacher names concurrently; repeated ids share one lookup.
async fn resolve_teachers<'a>(
    context: &Context,
    ids: impl Iterator<Item = &'a str>,
) -> HashMap<String, String> {
    let mut lookups = JoinSet::new();
    for id in ids {
        let cache = context.teachers.clone();
        let id = id.trim().to_string();
        lookups.spawn(async move {
            let name = cache.display_name(&id).await;
            (id, name)
        });
    }

    let mut names = HashMap::new();
    while let Some(joined) = lookups.join_next().await {
        if let Ok((id, name)) = joined {
            names.insert(id, name);
        }
    }
    names
}

fn print_payment(payment: &PaymentStatus) {
    println!(
        "{:>6}  course {:<8}  {:>8}  {}",
        payment.id,
        payment.course_id.as_deref().unwrap_or("-"),
        payment
            .amount
            .map_or_else(|| "-".to_string(), |amount| format!("{amount:.2}")),
        payment.status
    );
}
