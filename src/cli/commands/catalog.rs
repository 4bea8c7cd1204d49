//! Catalog, enrollment, wishlist and payment subcommands.

use clap::{Arg, ArgAction, Command};

pub const ARG_ID: &str = "id";
pub const ARG_COURSE_ID: &str = "course-id";
pub const ARG_SEARCH: &str = "search";
pub const ARG_CATEGORY: &str = "category";
pub const ARG_PAGE: &str = "page";
pub const ARG_SIZE: &str = "size";
pub const ARG_POST: &str = "post";
pub const ARG_TITLE: &str = "title";
pub const ARG_DESCRIPTION: &str = "description";
pub const ARG_PRICE: &str = "price";

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).help(help).required(true)
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new("courses")
            .about("Browse the course catalog")
            .arg(Arg::new(ARG_SEARCH).short('s').long(ARG_SEARCH).help("Search text"))
            .arg(
                Arg::new(ARG_CATEGORY)
                    .short('c')
                    .long(ARG_CATEGORY)
                    .help("Category filter"),
            )
            .arg(
                Arg::new(ARG_PAGE)
                    .long(ARG_PAGE)
                    .help("Page number")
                    .value_parser(clap::value_parser!(u32)),
            )
            .arg(
                Arg::new(ARG_SIZE)
                    .long(ARG_SIZE)
                    .help("Page size")
                    .value_parser(clap::value_parser!(u32).range(1..=100)),
            ),
        Command::new("course")
            .about("Show one course")
            .arg(id_arg(ARG_ID, "Course id")),
        Command::new("enroll")
            .about("Enroll in a course")
            .arg(id_arg(ARG_ID, "Course id")),
        Command::new("enrollments").about("List my enrollments"),
        Command::new("lessons")
            .about("List the lessons of a course")
            .arg(id_arg(ARG_COURSE_ID, "Course id")),
        Command::new("comments")
            .about("Read or post course comments")
            .arg(id_arg(ARG_COURSE_ID, "Course id"))
            .arg(
                Arg::new(ARG_POST)
                    .long(ARG_POST)
                    .value_name("TEXT")
                    .help("Post a comment instead of listing"),
            ),
        Command::new("wishlist")
            .about("Show or change the wishlist")
            .subcommand(Command::new("add").arg(id_arg(ARG_COURSE_ID, "Course id")))
            .subcommand(Command::new("remove").arg(id_arg(ARG_COURSE_ID, "Course id"))),
        Command::new("payments")
            .about("List my payments or show one payment")
            .arg(Arg::new(ARG_ID).help("Payment id")),
        Command::new("checkout")
            .about("Start a checkout for a course")
            .arg(id_arg(ARG_COURSE_ID, "Course id")),
        Command::new("teacher")
            .about("Look up a teacher")
            .arg(
                Arg::new(ARG_ID)
                    .help("Teacher id")
                    .required(true)
                    .num_args(1..)
                    .action(ArgAction::Append),
            ),
        Command::new("teaching").about("List the courses I teach"),
        Command::new("publish")
            .about("Create a course (teachers only)")
            .arg(Arg::new(ARG_TITLE).long(ARG_TITLE).help("Course title").required(true))
            .arg(
                Arg::new(ARG_DESCRIPTION)
                    .long(ARG_DESCRIPTION)
                    .help("Course description"),
            )
            .arg(
                Arg::new(ARG_PRICE)
                    .long(ARG_PRICE)
                    .help("Price")
                    .value_parser(clap::value_parser!(f64)),
            )
            .arg(Arg::new(ARG_CATEGORY).long(ARG_CATEGORY).help("Category")),
    ]
}
