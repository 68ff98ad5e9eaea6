//! Day rating rendering.

/// Background color code for each rating that gets one.
fn background_color(rating: i64) -> Option<&'static str> {
    match rating {
        -2 => Some("12"),
        -1 => Some("1"),
        1 => Some("4"),
        2 => Some("15"),
        _ => None,
    }
}

/// Render a day rating in bold, highlighted with the rating's background
/// color. `0` and values outside `-2..=2` are rendered plain bold.
pub fn formatted_day_rating(rating: i64) -> String {
    match background_color(rating) {
        Some(color) => {
            format!("**=={rating}<!-- {{\"backgroundCycleColor\":\"{color}\"}} -->==**")
        }
        None => format!("**{rating}**"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    macro_rules! rating_tests {
        ($($name:ident $rating:expr => $expected:expr)*) => {
        $(
            #[test]
            fn $name() {
                assert_eq!(formatted_day_rating($rating), $expected);
            }
        )*
        }
    }

    rating_tests! {
        terrible -2 => r#"**==-2<!-- {"backgroundCycleColor":"12"} -->==**"#
        poor -1 => r#"**==-1<!-- {"backgroundCycleColor":"1"} -->==**"#
        neutral 0 => "**0**"
        good 1 => r#"**==1<!-- {"backgroundCycleColor":"4"} -->==**"#
        wonderful 2 => r#"**==2<!-- {"backgroundCycleColor":"15"} -->==**"#
        out_of_range 99 => "**99**"
        negative_out_of_range -3 => "**-3**"
    }
}
