//! Domain models for the Green Life Expo site.

pub mod contact_submission;
pub mod dashboard;
pub mod faq;
pub mod notice;
pub mod package;
pub mod page_content;
pub mod site_setting;

pub use contact_submission::{
    ContactForm, ContactSubmission, ExhibitorForm, NewSubmission, SponsorForm, SubmissionStatus,
    SubmissionType,
};
pub use dashboard::DashboardStats;
pub use faq::{Faq, NewFaq};
pub use notice::{Notice, NoticeLevel};
pub use package::{NewPackage, Package, PackageType};
pub use page_content::{group_by_section, PageContentItem, PageSection};
pub use site_setting::{SettingCategory, SiteSetting};
