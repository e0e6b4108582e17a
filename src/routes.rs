use crate::{
    api::{allowance, deduction, employee, payroll},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_conf = build_limiter(config.rate_login_per_min);
    let register_conf = build_limiter(config.rate_register_per_min);
    let refresh_conf = build_limiter(config.rate_refresh_per_min);
    let protected_conf = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_conf))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_conf))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_conf))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_conf))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&protected_conf)) // rate limiting
            .service(
                web::scope("/employees")
                    // static routes must come before the {code} lookups
                    .service(
                        web::resource("/stats").route(web::get().to(employee::employee_stats)),
                    )
                    .service(
                        web::resource("/seed-codes")
                            .route(web::post().to(employee::seed_employee_codes)),
                    )
                    .service(
                        web::resource("/heal-breakdowns")
                            .route(web::post().to(employee::heal_breakdowns)),
                    )
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{code}
                    .service(
                        web::resource("/{code}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_profile))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/{code}/composition")
                            .route(web::put().to(employee::update_composition)),
                    )
                    .service(
                        web::resource("/{code}/history")
                            .route(web::get().to(payroll::salary_history)),
                    )
                    .service(
                        web::resource("/{code}/payroll")
                            .route(web::get().to(payroll::payroll_history)),
                    )
                    .service(
                        web::resource("/{code}/projection")
                            .route(web::get().to(payroll::salary_projection)),
                    )
                    .service(
                        web::resource("/{code}/credit-salary")
                            .route(web::post().to(payroll::credit_salary)),
                    )
                    .service(
                        web::resource("/{code}/send-payslip")
                            .route(web::post().to(payroll::send_payslip)),
                    )
                    .service(
                        web::resource("/{code}/allowances")
                            .route(web::post().to(allowance::add_allowance))
                            .route(web::get().to(allowance::list_allowances)),
                    )
                    .service(
                        web::resource("/{code}/allowances/{allowance_id}")
                            .route(web::delete().to(allowance::delete_allowance)),
                    )
                    .service(
                        web::resource("/{code}/deductions")
                            .route(web::post().to(deduction::add_deduction))
                            .route(web::get().to(deduction::list_deductions)),
                    )
                    .service(
                        web::resource("/{code}/deductions/{deduction_id}")
                            .route(web::delete().to(deduction::delete_deduction)),
                    ),
            ),
    );
}
